use crate::domain::{
    entities::{bookings::BookingEntity, guests::GuestEntity},
    value_objects::enums::payment_methods::PaymentMethod,
};

use super::EmailMessage;

/// `1190500` -> `1,190,500`.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub struct BookingConfirmation<'a> {
    pub booking: &'a BookingEntity,
    pub guest: &'a GuestEntity,
    pub property_name: &'a str,
    pub room_number: &'a str,
    pub amount_due_now: i64,
    pub payment_url: Option<&'a str>,
}

pub fn booking_confirmation(input: &BookingConfirmation<'_>) -> EmailMessage {
    let booking = input.booking;
    let nights = (booking.check_out - booking.check_in).num_days();

    let mut body = format!(
        "Hello {},\n\n\
         Thank you for booking with {}.\n\n\
         Booking code: {}\n\
         Room: {}\n\
         Check-in: {}\n\
         Check-out: {} ({} nights)\n\
         Total: {}\n\
         Status: {}\n",
        input.guest.full_name,
        input.property_name,
        booking.booking_code,
        input.room_number,
        booking.check_in,
        booking.check_out,
        nights,
        format_amount(booking.total_amount),
        booking.status,
    );

    match input.payment_url {
        Some(url) => body.push_str(&format!(
            "\nPlease complete your payment of {} here:\n{}\n",
            format_amount(input.amount_due_now),
            url
        )),
        None if input.amount_due_now > 0 => body.push_str(&format!(
            "\nAmount due: {}\n",
            format_amount(input.amount_due_now)
        )),
        None => body.push_str("\nPayment will be settled at the property.\n"),
    }

    EmailMessage {
        to: input.guest.email.clone(),
        subject: format!("Booking {} at {}", booking.booking_code, input.property_name),
        body,
    }
}

pub fn payment_receipt(
    booking: &BookingEntity,
    guest: &GuestEntity,
    amount: i64,
    method: PaymentMethod,
) -> EmailMessage {
    let body = format!(
        "Hello {},\n\n\
         We received your payment for booking {}.\n\n\
         Amount: {}\n\
         Method: {}\n\
         Paid so far: {} of {}\n\
         Outstanding: {}\n",
        guest.full_name,
        booking.booking_code,
        format_amount(amount),
        method,
        format_amount(booking.paid_amount),
        format_amount(booking.total_amount),
        format_amount(booking.outstanding()),
    );

    EmailMessage {
        to: guest.email.clone(),
        subject: format!("Payment receipt for booking {}", booking.booking_code),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn guest() -> GuestEntity {
        let now = Utc::now();
        GuestEntity {
            id: Uuid::new_v4(),
            full_name: "Rina Hartono".to_string(),
            email: "rina@example.com".to_string(),
            phone: None,
            id_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn booking() -> BookingEntity {
        let now = Utc::now();
        BookingEntity {
            id: Uuid::new_v4(),
            booking_code: "BK-20260110-ABC234".to_string(),
            room_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
            stay_type: "daily".to_string(),
            base_price: 1_050_000,
            tax_amount: 115_500,
            service_fee: 25_000,
            discount_amount: 0,
            deposit_amount: 1_190_500,
            total_amount: 1_190_500,
            paid_amount: 500_000,
            payment_status: "partial".to_string(),
            status: "confirmed".to_string(),
            payment_method_type: "pay_at_property".to_string(),
            special_requests: None,
            checked_in_at: None,
            checked_out_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_000), "1,000");
        assert_eq!(format_amount(1_190_500), "1,190,500");
        assert_eq!(format_amount(-25_000), "-25,000");
    }

    #[test]
    fn confirmation_links_the_payment_page_when_present() {
        let booking = booking();
        let guest = guest();
        let message = booking_confirmation(&BookingConfirmation {
            booking: &booking,
            guest: &guest,
            property_name: "Harbor House",
            room_number: "101",
            amount_due_now: 1_190_500,
            payment_url: Some("https://pay.example/inv_1"),
        });

        assert_eq!(message.to, "rina@example.com");
        assert_eq!(message.subject, "Booking BK-20260110-ABC234 at Harbor House");
        assert!(message.body.contains("(3 nights)"));
        assert!(message.body.contains("https://pay.example/inv_1"));
        assert!(message.body.contains("1,190,500"));
    }

    #[test]
    fn receipt_shows_the_remaining_balance() {
        let message = payment_receipt(&booking(), &guest(), 500_000, PaymentMethod::Cash);
        assert!(message.body.contains("Amount: 500,000"));
        assert!(message.body.contains("Outstanding: 690,500"));
        assert!(message.body.contains("Method: cash"));
    }
}
