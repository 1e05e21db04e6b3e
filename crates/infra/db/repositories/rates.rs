use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, PgConnection, QueryResult, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::rates::{
            RateEntity, RoomRateOverrideEntity, UpsertRateEntity, UpsertRoomRateOverrideEntity,
        },
        repositories::rates::RateRepository,
        value_objects::enums::stay_types::StayType,
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{rates, room_rate_overrides},
    },
};

pub struct RatePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RatePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn find_rate_for_update(
    conn: &mut PgConnection,
    room_type_id: Uuid,
    stay_type: &str,
    property_id: Option<Uuid>,
) -> QueryResult<Option<RateEntity>> {
    let base = rates::table
        .filter(rates::room_type_id.eq(room_type_id))
        .filter(rates::stay_type.eq(stay_type))
        .filter(rates::is_active.eq(true))
        .select(RateEntity::as_select());

    // Boxed queries cannot carry a locking clause, hence the two arms.
    match property_id {
        Some(property_id) => base
            .filter(rates::property_id.eq(property_id))
            .for_update()
            .first::<RateEntity>(conn)
            .optional(),
        None => base
            .filter(rates::property_id.is_null())
            .for_update()
            .first::<RateEntity>(conn)
            .optional(),
    }
}

fn upsert_override_in(
    conn: &mut PgConnection,
    rate_override: &UpsertRoomRateOverrideEntity,
) -> QueryResult<RoomRateOverrideEntity> {
    let existing = room_rate_overrides::table
        .filter(room_rate_overrides::room_id.eq(rate_override.room_id))
        .filter(room_rate_overrides::stay_type.eq(&rate_override.stay_type))
        .filter(room_rate_overrides::is_active.eq(true))
        .select(room_rate_overrides::id)
        .for_update()
        .first::<Uuid>(conn)
        .optional()?;

    match existing {
        Some(override_id) => update(room_rate_overrides::table.find(override_id))
            .set((
                room_rate_overrides::price.eq(rate_override.price),
                room_rate_overrides::updated_at.eq(Utc::now()),
            ))
            .returning(RoomRateOverrideEntity::as_select())
            .get_result(conn),
        None => insert_into(room_rate_overrides::table)
            .values(rate_override)
            .returning(RoomRateOverrideEntity::as_select())
            .get_result(conn),
    }
}

#[async_trait]
impl RateRepository for RatePostgres {
    async fn find_active_override(
        &self,
        room_id: Uuid,
        stay_type: StayType,
    ) -> Result<Option<RoomRateOverrideEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = room_rate_overrides::table
            .filter(room_rate_overrides::room_id.eq(room_id))
            .filter(room_rate_overrides::stay_type.eq(stay_type.as_str()))
            .filter(room_rate_overrides::is_active.eq(true))
            .select(RoomRateOverrideEntity::as_select())
            .first::<RoomRateOverrideEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_active_rate(
        &self,
        room_type_id: Uuid,
        stay_type: StayType,
        property_id: Option<Uuid>,
    ) -> Result<Option<RateEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = rates::table
            .filter(rates::room_type_id.eq(room_type_id))
            .filter(rates::stay_type.eq(stay_type.as_str()))
            .filter(rates::is_active.eq(true))
            .select(RateEntity::as_select())
            .into_boxed();

        query = match property_id {
            Some(property_id) => query.filter(rates::property_id.eq(property_id)),
            None => query.filter(rates::property_id.is_null()),
        };

        let result = query.first::<RateEntity>(&mut conn).optional()?;

        Ok(result)
    }

    async fn upsert_rate(&self, rate: UpsertRateEntity) -> Result<RateEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<RateEntity, diesel::result::Error, _>(|tx| {
            let existing =
                find_rate_for_update(tx, rate.room_type_id, &rate.stay_type, rate.property_id)?;

            match existing {
                Some(current) => update(rates::table.find(current.id))
                    .set((
                        rates::price.eq(rate.price),
                        rates::deposit_percentage.eq(rate.deposit_percentage),
                        rates::tax_percentage.eq(rate.tax_percentage),
                        rates::service_fee.eq(rate.service_fee),
                        rates::updated_at.eq(Utc::now()),
                    ))
                    .returning(RateEntity::as_select())
                    .get_result(tx),
                None => insert_into(rates::table)
                    .values(&rate)
                    .returning(RateEntity::as_select())
                    .get_result(tx),
            }
        })?;

        Ok(result)
    }

    async fn upsert_override(
        &self,
        rate_override: UpsertRoomRateOverrideEntity,
    ) -> Result<RoomRateOverrideEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<RoomRateOverrideEntity, diesel::result::Error, _>(|tx| {
            upsert_override_in(tx, &rate_override)
        })?;

        Ok(result)
    }

    async fn upsert_overrides(&self, overrides: Vec<UpsertRoomRateOverrideEntity>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let written = conn.transaction::<usize, diesel::result::Error, _>(|tx| {
            for rate_override in &overrides {
                upsert_override_in(tx, rate_override)?;
            }
            Ok(overrides.len())
        })?;

        Ok(written)
    }

    async fn deactivate_override(&self, room_id: Uuid, stay_type: StayType) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(room_rate_overrides::table)
            .filter(room_rate_overrides::room_id.eq(room_id))
            .filter(room_rate_overrides::stay_type.eq(stay_type.as_str()))
            .filter(room_rate_overrides::is_active.eq(true))
            .set((
                room_rate_overrides::is_active.eq(false),
                room_rate_overrides::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn list_active_rates(&self, room_type_id: Option<Uuid>) -> Result<Vec<RateEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = rates::table
            .filter(rates::is_active.eq(true))
            .select(RateEntity::as_select())
            .into_boxed();

        if let Some(room_type_id) = room_type_id {
            query = query.filter(rates::room_type_id.eq(room_type_id));
        }

        let results = query
            .order((rates::room_type_id.asc(), rates::stay_type.asc()))
            .load::<RateEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_active_overrides(&self, room_id: Uuid) -> Result<Vec<RoomRateOverrideEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = room_rate_overrides::table
            .filter(room_rate_overrides::room_id.eq(room_id))
            .filter(room_rate_overrides::is_active.eq(true))
            .select(RoomRateOverrideEntity::as_select())
            .order(room_rate_overrides::stay_type.asc())
            .load::<RoomRateOverrideEntity>(&mut conn)?;

        Ok(results)
    }
}
