use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    enums::stay_types::StayType, rates::ResolvedRate, stays::StayDates,
};

/// Price components of a stay, in whole currency units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub units: i64,
    pub base_price: i64,
    pub tax: i64,
    pub service_fee: i64,
    pub discount: i64,
    pub total: i64,
    pub deposit: i64,
}

/// Nights below a week bill daily, below four weeks weekly, monthly after that.
pub fn suggest_stay_type(nights: i64) -> StayType {
    if nights < 7 {
        StayType::Daily
    } else if nights < 28 {
        StayType::Weekly
    } else {
        StayType::Monthly
    }
}

/// Billable units for a night count; never less than one.
pub fn billable_units(nights: i64, stay_type: StayType) -> i64 {
    let unit = stay_type.unit_days();
    let units = (nights + unit - 1).div_euclid(unit);
    units.max(1)
}

pub fn calculate_price(rate: &ResolvedRate, stay: &StayDates, stay_type: StayType) -> PriceBreakdown {
    calculate_price_with_discount(rate, stay, stay_type, 0)
}

/// Same as [`calculate_price`] with a promotional discount. The discount is clamped
/// into `[0, base + tax + service_fee]`, so it can only lower the total.
pub fn calculate_price_with_discount(
    rate: &ResolvedRate,
    stay: &StayDates,
    stay_type: StayType,
    discount: i64,
) -> PriceBreakdown {
    let units = billable_units(stay.nights(), stay_type);
    let base_price = rate.price * units;
    // Rounded once on the aggregate, never per unit.
    let tax = percent_of(base_price, rate.tax_percentage);
    let service_fee = rate.service_fee;
    let gross = base_price + tax + service_fee;
    let discount = discount.clamp(0, gross.max(0));
    let total = gross - discount;
    let deposit = percent_of(total, rate.deposit_percentage);

    PriceBreakdown {
        units,
        base_price,
        tax,
        service_fee,
        discount,
        total,
        deposit,
    }
}

/// `round_half_up(amount * percentage / 100)` in integer arithmetic. The percentage
/// is taken to two decimals (basis points), so 100% returns `amount` exactly.
pub fn percent_of(amount: i64, percentage: f64) -> i64 {
    if !percentage.is_finite() {
        return 0;
    }
    let basis_points = (percentage * 100.0).round() as i128;
    let scaled = amount as i128 * basis_points;
    let rounded = (scaled + 5_000).div_euclid(10_000);
    rounded as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::rates::RateSource;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn rate(price: i64, tax: f64, service_fee: i64, deposit: f64) -> ResolvedRate {
        ResolvedRate {
            source: RateSource::Global,
            source_id: Uuid::nil(),
            stay_type: StayType::Daily,
            price,
            deposit_percentage: deposit,
            tax_percentage: tax,
            service_fee,
        }
    }

    fn stay(nights: i64) -> StayDates {
        let check_in = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        StayDates::new(check_in, check_in + Duration::days(nights)).unwrap()
    }

    #[test]
    fn daily_three_nights_with_tax_and_fee() {
        let breakdown = calculate_price(&rate(350_000, 11.0, 25_000, 100.0), &stay(3), StayType::Daily);

        assert_eq!(breakdown.units, 3);
        assert_eq!(breakdown.base_price, 1_050_000);
        assert_eq!(breakdown.tax, 115_500);
        assert_eq!(breakdown.service_fee, 25_000);
        assert_eq!(breakdown.discount, 0);
        assert_eq!(breakdown.total, 1_190_500);
        assert_eq!(breakdown.deposit, 1_190_500);
    }

    #[test]
    fn weekly_ten_nights_bills_two_weeks() {
        let breakdown = calculate_price(&rate(2_000_000, 0.0, 0, 100.0), &stay(10), StayType::Weekly);

        assert_eq!(breakdown.units, 2);
        assert_eq!(breakdown.base_price, 4_000_000);
    }

    #[test]
    fn monthly_thirty_five_nights_with_thirty_percent_deposit() {
        let breakdown =
            calculate_price(&rate(5_500_000, 11.0, 50_000, 30.0), &stay(35), StayType::Monthly);

        assert_eq!(breakdown.units, 2);
        assert_eq!(breakdown.base_price, 11_000_000);
        assert_eq!(breakdown.tax, 1_210_000);
        assert_eq!(breakdown.total, 12_260_000);
        assert_eq!(breakdown.deposit, 3_678_000);
    }

    #[test]
    fn tax_rounds_half_up_once_on_the_aggregate() {
        // 3 * 105 = 315; 315 * 10% = 31.5 -> 32. Per-unit rounding would give 3 * 11 = 33.
        let breakdown = calculate_price(&rate(105, 10.0, 0, 0.0), &stay(3), StayType::Daily);
        assert_eq!(breakdown.tax, 32);
        assert_eq!(breakdown.deposit, 0);
    }

    #[test]
    fn discount_is_clamped_to_the_gross_amount() {
        let breakdown =
            calculate_price_with_discount(&rate(100, 0.0, 0, 100.0), &stay(1), StayType::Daily, 500);
        assert_eq!(breakdown.discount, 100);
        assert_eq!(breakdown.total, 0);

        let breakdown =
            calculate_price_with_discount(&rate(100, 0.0, 0, 100.0), &stay(1), StayType::Daily, -20);
        assert_eq!(breakdown.discount, 0);
        assert_eq!(breakdown.total, 100);
    }

    #[test]
    fn stay_type_suggestion_boundaries() {
        assert_eq!(suggest_stay_type(1), StayType::Daily);
        assert_eq!(suggest_stay_type(6), StayType::Daily);
        assert_eq!(suggest_stay_type(7), StayType::Weekly);
        assert_eq!(suggest_stay_type(27), StayType::Weekly);
        assert_eq!(suggest_stay_type(28), StayType::Monthly);
        assert_eq!(suggest_stay_type(400), StayType::Monthly);
    }

    fn any_stay_type() -> impl Strategy<Value = StayType> {
        prop_oneof![
            Just(StayType::Daily),
            Just(StayType::Weekly),
            Just(StayType::Monthly),
        ]
    }

    proptest! {
        #[test]
        fn full_deposit_always_equals_total(
            price in 0i64..50_000_000,
            tax in 0u32..2_500,
            service_fee in 0i64..1_000_000,
            nights in 1i64..400,
            stay_type in any_stay_type(),
        ) {
            let rate = rate(price, f64::from(tax) / 100.0, service_fee, 100.0);
            let breakdown = calculate_price(&rate, &stay(nights), stay_type);
            prop_assert_eq!(breakdown.deposit, breakdown.total);
        }

        #[test]
        fn units_follow_the_stay_type(nights in 1i64..1_000, stay_type in any_stay_type()) {
            let units = billable_units(nights, stay_type);
            prop_assert!(units >= 1);
            let expected = match stay_type {
                StayType::Daily => nights,
                StayType::Weekly => (nights + 6) / 7,
                StayType::Monthly => (nights + 29) / 30,
            };
            prop_assert_eq!(units, expected);
        }

        #[test]
        fn suggestion_matches_night_ranges(nights in 1i64..1_000) {
            let expected = match nights {
                1..=6 => StayType::Daily,
                7..=27 => StayType::Weekly,
                _ => StayType::Monthly,
            };
            prop_assert_eq!(suggest_stay_type(nights), expected);
        }

        #[test]
        fn total_is_the_sum_of_components(
            price in 0i64..50_000_000,
            tax in 0u32..2_500,
            service_fee in 0i64..1_000_000,
            deposit in 0u32..=100,
            discount in 0i64..100_000_000,
            nights in 1i64..400,
            stay_type in any_stay_type(),
        ) {
            let rate = rate(price, f64::from(tax) / 100.0, service_fee, f64::from(deposit));
            let breakdown = calculate_price_with_discount(&rate, &stay(nights), stay_type, discount);
            prop_assert!(breakdown.discount >= 0);
            prop_assert_eq!(
                breakdown.total,
                breakdown.base_price + breakdown.tax + breakdown.service_fee - breakdown.discount
            );
            prop_assert!(breakdown.total >= 0);
            prop_assert!(breakdown.deposit <= breakdown.total);
        }
    }
}
