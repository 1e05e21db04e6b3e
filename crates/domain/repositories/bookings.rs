use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity},
    value_objects::enums::booking_statuses::BookingStatus,
};

#[async_trait]
#[automock]
pub trait BookingRepository {
    /// Inserts the booking only if no non-terminal booking on the same room overlaps
    /// its dates, as one atomic step. `None` means the room was taken.
    async fn insert_booking_if_available(
        &self,
        booking: InsertBookingEntity,
    ) -> Result<Option<BookingEntity>>;

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;

    async fn find_by_code(&self, booking_code: String) -> Result<Option<BookingEntity>>;

    /// Moves the booking from `from` to `to`, stamping the matching timestamp.
    /// `None` when the booking is no longer in `from`.
    async fn transition_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>>;

    async fn list_pending(&self, created_before: Option<DateTime<Utc>>) -> Result<Vec<BookingEntity>>;
}
