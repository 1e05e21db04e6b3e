use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::room_statuses::RoomStatus,
    infra::db::postgres::schema::{room_blocks, rooms},
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = rooms)]
pub struct RoomEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_type_id: Uuid,
    pub room_number: String,
    pub floor: Option<i32>,
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomEntity {
    pub fn room_status(&self) -> RoomStatus {
        RoomStatus::from_str(&self.status).unwrap_or(RoomStatus::Blocked)
    }
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = room_blocks)]
pub struct RoomBlockEntity {
    pub id: Uuid,
    pub room_id: Uuid,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = room_blocks)]
pub struct InsertRoomBlockEntity {
    pub room_id: Uuid,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub reason: Option<String>,
}
