use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{
        properties::PropertyEntity,
        room_types::RoomTypeEntity,
        rooms::{RoomBlockEntity, RoomEntity},
    },
    value_objects::{enums::room_statuses::RoomStatus, stays::StayDates},
};

/// A room joined with the property and room type it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDetails {
    pub room: RoomEntity,
    pub property: PropertyEntity,
    pub room_type: RoomTypeEntity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySearch {
    pub stay: StayDates,
    pub property_id: Option<Uuid>,
    pub room_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: String,
    pub check_out: String,
    pub property_id: Option<Uuid>,
    pub room_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAvailabilityQuery {
    pub check_in: String,
    pub check_out: String,
    pub exclude_booking_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomAvailabilityDto {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertySummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

impl From<&PropertyEntity> for PropertySummary {
    fn from(value: &PropertyEntity) -> Self {
        Self {
            id: value.id,
            slug: value.slug.clone(),
            name: value.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomTypeSummary {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub amenities: Vec<String>,
}

impl From<&RoomTypeEntity> for RoomTypeSummary {
    fn from(value: &RoomTypeEntity) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            capacity: value.capacity,
            amenities: value.amenity_list(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableRoomDto {
    pub id: Uuid,
    pub room_number: String,
    pub floor: Option<i32>,
    pub status: RoomStatus,
    pub property: PropertySummary,
    pub room_type: RoomTypeSummary,
}

impl From<&RoomDetails> for AvailableRoomDto {
    fn from(value: &RoomDetails) -> Self {
        Self {
            id: value.room.id,
            room_number: value.room.room_number.clone(),
            floor: value.room.floor,
            status: value.room.room_status(),
            property: PropertySummary::from(&value.property),
            room_type: RoomTypeSummary::from(&value.room_type),
        }
    }
}

/// Advisory "N rooms left" figure per room type; not a hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomsLeftDto {
    pub room_type: RoomTypeSummary,
    pub rooms_left: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomBlockModel {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomBlockDto {
    pub id: Uuid,
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl From<RoomBlockEntity> for RoomBlockDto {
    fn from(value: RoomBlockEntity) -> Self {
        Self {
            id: value.id,
            room_id: value.room_id,
            start_date: value.start_date,
            end_date: value.end_date,
            reason: value.reason,
        }
    }
}
