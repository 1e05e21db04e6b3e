use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{rates, room_rate_overrides};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = rates)]
pub struct RateEntity {
    pub id: Uuid,
    pub room_type_id: Uuid,
    /// `None` is the global default for the room type.
    pub property_id: Option<Uuid>,
    pub stay_type: String,
    pub price: i64,
    pub deposit_percentage: f64,
    pub tax_percentage: f64,
    pub service_fee: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by a rate upsert. The key is (room_type_id, stay_type, property_id).
#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = rates)]
pub struct UpsertRateEntity {
    pub room_type_id: Uuid,
    pub property_id: Option<Uuid>,
    pub stay_type: String,
    pub price: i64,
    pub deposit_percentage: f64,
    pub tax_percentage: f64,
    pub service_fee: i64,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = room_rate_overrides)]
pub struct RoomRateOverrideEntity {
    pub id: Uuid,
    pub room_id: Uuid,
    pub stay_type: String,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by an override upsert. The key is (room_id, stay_type).
#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = room_rate_overrides)]
pub struct UpsertRoomRateOverrideEntity {
    pub room_id: Uuid,
    pub stay_type: String,
    pub price: i64,
}
