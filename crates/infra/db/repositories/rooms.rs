use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            properties::PropertyEntity,
            room_types::RoomTypeEntity,
            rooms::{InsertRoomBlockEntity, RoomBlockEntity, RoomEntity},
        },
        repositories::rooms::RoomRepository,
        value_objects::{enums::room_statuses::RoomStatus, rooms::RoomDetails},
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{properties, room_blocks, room_types, rooms},
    },
};

pub struct RoomPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RoomPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RoomRepository for RoomPostgres {
    async fn find_room_details(&self, room_id: Uuid) -> Result<Option<RoomDetails>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = rooms::table
            .inner_join(properties::table)
            .inner_join(room_types::table)
            .filter(rooms::id.eq(room_id))
            .filter(rooms::is_active.eq(true))
            .select((
                RoomEntity::as_select(),
                PropertyEntity::as_select(),
                RoomTypeEntity::as_select(),
            ))
            .first::<(RoomEntity, PropertyEntity, RoomTypeEntity)>(&mut conn)
            .optional()?;

        Ok(row.map(|(room, property, room_type)| RoomDetails {
            room,
            property,
            room_type,
        }))
    }

    async fn list_available_room_ids(&self, property_id: Uuid) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = rooms::table
            .filter(rooms::property_id.eq(property_id))
            .filter(rooms::is_active.eq(true))
            .filter(rooms::status.eq(RoomStatus::Available.as_str()))
            .select(rooms::id)
            .load::<Uuid>(&mut conn)?;

        Ok(results)
    }

    async fn update_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(rooms::table.find(room_id))
            .set((
                rooms::status.eq(status.as_str()),
                rooms::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn insert_block(&self, block: InsertRoomBlockEntity) -> Result<RoomBlockEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(room_blocks::table)
            .values(&block)
            .returning(RoomBlockEntity::as_select())
            .get_result::<RoomBlockEntity>(&mut conn)?;

        Ok(result)
    }
}
