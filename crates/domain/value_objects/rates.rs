use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::rates::{
        RateEntity, RoomRateOverrideEntity, UpsertRateEntity, UpsertRoomRateOverrideEntity,
    },
    value_objects::enums::stay_types::StayType,
};

/// Which tier produced a resolved rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    RoomOverride,
    Property,
    Global,
}

/// Rate-shaped value handed to the pricing engine, whatever tier it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedRate {
    pub source: RateSource,
    pub source_id: Uuid,
    pub stay_type: StayType,
    pub price: i64,
    pub deposit_percentage: f64,
    pub tax_percentage: f64,
    pub service_fee: i64,
}

impl ResolvedRate {
    pub fn from_rate(rate: &RateEntity, stay_type: StayType) -> Self {
        let source = if rate.property_id.is_some() {
            RateSource::Property
        } else {
            RateSource::Global
        };
        Self {
            source,
            source_id: rate.id,
            stay_type,
            price: rate.price,
            deposit_percentage: rate.deposit_percentage,
            tax_percentage: rate.tax_percentage,
            service_fee: rate.service_fee,
        }
    }

    /// Overrides only carry a price; deposit, tax and service fee are zero.
    pub fn from_override(rate_override: &RoomRateOverrideEntity, stay_type: StayType) -> Self {
        Self {
            source: RateSource::RoomOverride,
            source_id: rate_override.id,
            stay_type,
            price: rate_override.price,
            deposit_percentage: 0.0,
            tax_percentage: 0.0,
            service_fee: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuery {
    pub room_type_id: Uuid,
    pub stay_type: StayType,
    pub room_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRateModel {
    pub room_type_id: Uuid,
    pub property_id: Option<Uuid>,
    pub stay_type: StayType,
    pub price: i64,
    #[serde(default = "default_deposit_percentage")]
    pub deposit_percentage: f64,
    #[serde(default)]
    pub tax_percentage: f64,
    #[serde(default)]
    pub service_fee: i64,
}

fn default_deposit_percentage() -> f64 {
    100.0
}

impl UpsertRateModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.price < 0 {
            return Err("price must not be negative".to_string());
        }
        if !(0.0..=100.0).contains(&self.deposit_percentage) {
            return Err("deposit_percentage must be between 0 and 100".to_string());
        }
        if !self.tax_percentage.is_finite() || self.tax_percentage < 0.0 {
            return Err("tax_percentage must not be negative".to_string());
        }
        if self.service_fee < 0 {
            return Err("service_fee must not be negative".to_string());
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpsertRateEntity {
        UpsertRateEntity {
            room_type_id: self.room_type_id,
            property_id: self.property_id,
            stay_type: self.stay_type.to_string(),
            price: self.price,
            deposit_percentage: self.deposit_percentage,
            tax_percentage: self.tax_percentage,
            service_fee: self.service_fee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRoomRateModel {
    pub room_id: Uuid,
    pub stay_type: StayType,
    pub price: i64,
}

impl UpsertRoomRateModel {
    pub fn to_entity(&self) -> UpsertRoomRateOverrideEntity {
        UpsertRoomRateOverrideEntity {
            room_id: self.room_id,
            stay_type: self.stay_type.to_string(),
            price: self.price,
        }
    }
}

/// Applies one price to every currently available room of a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRoomRateModel {
    pub stay_type: StayType,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkRoomRateDto {
    pub property_id: Uuid,
    pub stay_type: StayType,
    pub rooms_updated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateListQuery {
    pub room_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateDto {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub property_id: Option<Uuid>,
    pub stay_type: String,
    pub price: i64,
    pub deposit_percentage: f64,
    pub tax_percentage: f64,
    pub service_fee: i64,
}

impl From<RateEntity> for RateDto {
    fn from(value: RateEntity) -> Self {
        Self {
            id: value.id,
            room_type_id: value.room_type_id,
            property_id: value.property_id,
            stay_type: value.stay_type,
            price: value.price,
            deposit_percentage: value.deposit_percentage,
            tax_percentage: value.tax_percentage,
            service_fee: value.service_fee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRateDto {
    pub id: Uuid,
    pub room_id: Uuid,
    pub stay_type: String,
    pub price: i64,
}

impl From<RoomRateOverrideEntity> for RoomRateDto {
    fn from(value: RoomRateOverrideEntity) -> Self {
        Self {
            id: value.id,
            room_id: value.room_id,
            stay_type: value.stay_type,
            price: value.price,
        }
    }
}
