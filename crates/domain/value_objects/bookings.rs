use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::{
        enums::{
            booking_statuses::BookingStatus, payment_method_types::PaymentMethodType,
            payment_statuses::BookingPaymentStatus,
        },
        payments::PaymentDto,
    },
};

const BOOKING_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// `BK-YYYYMMDD-XXXXXX`, the suffix drawn from an alphabet without look-alike characters.
pub fn generate_booking_code(created_on: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BOOKING_CODE_ALPHABET[rng.gen_range(0..BOOKING_CODE_ALPHABET.len())] as char)
        .collect();
    format!("BK-{}-{}", created_on.format("%Y%m%d"), suffix)
}

/// Front-desk actions that move a booking along its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusTransition {
    CheckIn,
    CheckOut,
    Cancel,
    NoShow,
}

impl StatusTransition {
    pub fn target(&self) -> BookingStatus {
        match self {
            StatusTransition::CheckIn => BookingStatus::CheckedIn,
            StatusTransition::CheckOut => BookingStatus::CheckedOut,
            StatusTransition::Cancel => BookingStatus::Cancelled,
            StatusTransition::NoShow => BookingStatus::NoShow,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PendingBookingsQuery {
    pub created_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDto {
    pub id: Uuid,
    pub booking_code: String,
    pub room_id: Uuid,
    pub guest_id: Uuid,
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub stay_type: String,
    pub base_price: i64,
    pub tax_amount: i64,
    pub service_fee: i64,
    pub discount_amount: i64,
    pub deposit_amount: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub outstanding_amount: i64,
    pub payment_status: BookingPaymentStatus,
    pub status: BookingStatus,
    pub payment_method_type: PaymentMethodType,
    pub special_requests: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub payments: Vec<PaymentDto>,
}

impl From<BookingEntity> for BookingDto {
    fn from(value: BookingEntity) -> Self {
        Self {
            outstanding_amount: value.outstanding(),
            payment_status: value.booking_payment_status(),
            status: value.booking_status(),
            payment_method_type: value.method_type(),
            id: value.id,
            booking_code: value.booking_code,
            room_id: value.room_id,
            guest_id: value.guest_id,
            property_id: value.property_id,
            check_in: value.check_in,
            check_out: value.check_out,
            stay_type: value.stay_type,
            base_price: value.base_price,
            tax_amount: value.tax_amount,
            service_fee: value.service_fee,
            discount_amount: value.discount_amount,
            deposit_amount: value.deposit_amount,
            total_amount: value.total_amount,
            paid_amount: value.paid_amount,
            special_requests: value.special_requests,
            checked_in_at: value.checked_in_at,
            checked_out_at: value.checked_out_at,
            cancelled_at: value.cancelled_at,
            created_at: value.created_at,
            payments: Vec::new(),
        }
    }
}
