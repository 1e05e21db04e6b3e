use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::rooms::{InsertRoomBlockEntity, RoomBlockEntity},
    value_objects::{enums::room_statuses::RoomStatus, rooms::RoomDetails},
};

#[async_trait]
#[automock]
pub trait RoomRepository {
    async fn find_room_details(&self, room_id: Uuid) -> Result<Option<RoomDetails>>;

    /// Active rooms of a property whose operational status is `available`.
    async fn list_available_room_ids(&self, property_id: Uuid) -> Result<Vec<Uuid>>;

    async fn update_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()>;

    async fn insert_block(&self, block: InsertRoomBlockEntity) -> Result<RoomBlockEntity>;
}
