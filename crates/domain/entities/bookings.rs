use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::{
        booking_statuses::BookingStatus, payment_method_types::PaymentMethodType,
        payment_statuses::BookingPaymentStatus, stay_types::StayType,
    },
    infra::db::postgres::schema::bookings,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = bookings)]
pub struct BookingEntity {
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
    pub payment_status: String,
    pub status: String,
    pub payment_method_type: String,
    pub special_requests: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingEntity {
    /// Unknown strings are read as `Cancelled` so a corrupt row never holds a room.
    pub fn booking_status(&self) -> BookingStatus {
        BookingStatus::from_str(&self.status).unwrap_or(BookingStatus::Cancelled)
    }

    pub fn booking_payment_status(&self) -> BookingPaymentStatus {
        BookingPaymentStatus::from_str(&self.payment_status).unwrap_or_default()
    }

    pub fn stay(&self) -> Option<StayType> {
        StayType::from_str(&self.stay_type)
    }

    pub fn method_type(&self) -> PaymentMethodType {
        PaymentMethodType::from_str(&self.payment_method_type).unwrap_or_default()
    }

    pub fn outstanding(&self) -> i64 {
        (self.total_amount - self.paid_amount).max(0)
    }
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = bookings)]
pub struct InsertBookingEntity {
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
    pub payment_status: String,
    pub status: String,
    pub payment_method_type: String,
    pub special_requests: Option<String>,
}
