use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::rooms::{AvailabilitySearch, RoomDetails};

#[async_trait]
#[automock]
pub trait AvailabilityRepository {
    /// Single-room check, run under a lock on the room row so it serializes with
    /// concurrent booking inserts for the same room.
    async fn is_room_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool>;

    /// Rooms holding a non-terminal booking that overlaps the window.
    async fn find_conflicting_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Uuid>>;

    /// Rooms with a maintenance block overlapping the window.
    async fn find_blocked_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Uuid>>;

    /// Active rooms in status `available` matching the filters, minus `excluded`.
    async fn list_open_rooms(
        &self,
        search: AvailabilitySearch,
        excluded: Vec<Uuid>,
    ) -> Result<Vec<RoomDetails>>;
}
