use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::guests::UpsertGuestEntity,
    value_objects::{
        enums::{
            booking_statuses::BookingStatus, payment_method_types::PaymentMethodType,
            payment_statuses::BookingPaymentStatus, stay_types::StayType,
        },
        pricing::PriceBreakdown,
        rates::RateSource,
        stays::StayDates,
        validation::{FieldError, is_plausible_email, parse_stay_dates},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestContact {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub id_number: Option<String>,
}

impl GuestContact {
    /// Email is the identity key, so it is stored trimmed and lowercased.
    pub fn to_upsert_entity(&self) -> UpsertGuestEntity {
        UpsertGuestEntity {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_ascii_lowercase(),
            phone: non_blank(self.phone.as_deref()),
            id_number: non_blank(self.id_number.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Public booking request. Dates stay as strings so malformed input comes back
/// as a field error rather than a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationModel {
    pub room_id: Uuid,
    pub check_in: String,
    pub check_out: String,
    pub guest: GuestContact,
    pub stay_type: Option<StayType>,
    pub payment_method_type: Option<PaymentMethodType>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReservation {
    pub room_id: Uuid,
    pub stay: StayDates,
    pub guest: GuestContact,
    pub stay_type: Option<StayType>,
    pub payment_method_type: PaymentMethodType,
    pub special_requests: Option<String>,
}

impl CreateReservationModel {
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedReservation, Vec<FieldError>> {
        let mut errors = Vec::new();

        let stay = parse_stay_dates(&self.check_in, &self.check_out, &mut errors);
        if let Some(stay) = stay {
            if stay.check_in < today {
                errors.push(FieldError::new("check_in", "must not be in the past"));
            }
        }

        if self.guest.full_name.trim().is_empty() {
            errors.push(FieldError::new("guest.full_name", "is required"));
        }
        if !is_plausible_email(&self.guest.email) {
            errors.push(FieldError::new("guest.email", "must be a valid email address"));
        }

        match stay {
            Some(stay) if errors.is_empty() => Ok(ValidatedReservation {
                room_id: self.room_id,
                stay,
                guest: self.guest.clone(),
                stay_type: self.stay_type,
                payment_method_type: self.payment_method_type.unwrap_or_default(),
                special_requests: non_blank(self.special_requests.as_deref()),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationDto {
    pub booking_id: Uuid,
    pub booking_code: String,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub payment_method_type: PaymentMethodType,
    pub stay_type: StayType,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub pricing: PriceBreakdown,
    /// Amount the guest is asked to pay online now; zero for pay-at-property.
    pub amount_due_now: i64,
    pub payment_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteQuery {
    pub room_id: Uuid,
    pub check_in: String,
    pub check_out: String,
    pub stay_type: Option<StayType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteDto {
    pub room_id: Uuid,
    pub stay_type: StayType,
    pub nights: i64,
    pub rate_source: RateSource,
    pub pricing: PriceBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(check_in: &str, check_out: &str, name: &str, email: &str) -> CreateReservationModel {
        CreateReservationModel {
            room_id: Uuid::new_v4(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            guest: GuestContact {
                full_name: name.to_string(),
                email: email.to_string(),
                phone: Some("  ".to_string()),
                id_number: None,
            },
            stay_type: None,
            payment_method_type: None,
            special_requests: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    #[test]
    fn valid_request_defaults_to_online_payment() {
        let validated = model("2026-05-02", "2026-05-05", "Ana", "ana@example.com")
            .validate(today())
            .unwrap();
        assert_eq!(validated.payment_method_type, PaymentMethodType::Online);
        assert_eq!(validated.stay.nights(), 3);
    }

    #[test]
    fn all_field_errors_are_collected() {
        let errors = model("2026-04-20", "2026-04-22", " ", "not-an-email")
            .validate(today())
            .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["check_in", "guest.full_name", "guest.email"]);
    }

    #[test]
    fn open_ended_stays_are_rejected() {
        let errors = model("2026-05-02", "9999-12-31", "Ana", "ana@example.com")
            .validate(today())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "check_out");
    }

    #[test]
    fn guest_identity_is_normalized() {
        let contact = GuestContact {
            full_name: " Ana Putri ".to_string(),
            email: " Ana@Example.COM ".to_string(),
            phone: Some(" ".to_string()),
            id_number: Some("3174".to_string()),
        };
        let entity = contact.to_upsert_entity();
        assert_eq!(entity.full_name, "Ana Putri");
        assert_eq!(entity.email, "ana@example.com");
        assert_eq!(entity.phone, None);
        assert_eq!(entity.id_number.as_deref(), Some("3174"));
    }
}
