use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::rates::{
        RateEntity, RoomRateOverrideEntity, UpsertRateEntity, UpsertRoomRateOverrideEntity,
    },
    value_objects::enums::stay_types::StayType,
};

#[async_trait]
#[automock]
pub trait RateRepository {
    async fn find_active_override(
        &self,
        room_id: Uuid,
        stay_type: StayType,
    ) -> Result<Option<RoomRateOverrideEntity>>;

    /// `property_id = None` looks up the global default row.
    async fn find_active_rate(
        &self,
        room_type_id: Uuid,
        stay_type: StayType,
        property_id: Option<Uuid>,
    ) -> Result<Option<RateEntity>>;

    /// Updates the active row for the key, inserting only when none exists.
    async fn upsert_rate(&self, rate: UpsertRateEntity) -> Result<RateEntity>;

    async fn upsert_override(
        &self,
        rate_override: UpsertRoomRateOverrideEntity,
    ) -> Result<RoomRateOverrideEntity>;

    /// Returns how many overrides were written.
    async fn upsert_overrides(&self, overrides: Vec<UpsertRoomRateOverrideEntity>) -> Result<usize>;

    async fn deactivate_override(&self, room_id: Uuid, stay_type: StayType) -> Result<bool>;

    async fn list_active_rates(&self, room_type_id: Option<Uuid>) -> Result<Vec<RateEntity>>;

    async fn list_active_overrides(&self, room_id: Uuid) -> Result<Vec<RoomRateOverrideEntity>>;
}
