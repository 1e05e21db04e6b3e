use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::room_types;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = room_types)]
pub struct RoomTypeEntity {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    /// JSON array of amenity labels.
    pub amenities: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl RoomTypeEntity {
    pub fn amenity_list(&self) -> Vec<String> {
        serde_json::from_value(self.amenities.clone()).unwrap_or_default()
    }
}
