use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{Connection, PgConnection, QueryResult, dsl::count_star, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{properties::PropertyEntity, room_types::RoomTypeEntity, rooms::RoomEntity},
        repositories::availability::AvailabilityRepository,
        value_objects::{
            enums::{booking_statuses::BookingStatus, room_statuses::RoomStatus},
            rooms::{AvailabilitySearch, RoomDetails},
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{bookings, properties, room_blocks, room_types, rooms},
    },
};

pub struct AvailabilityPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AvailabilityPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Counts non-terminal bookings on the room overlapping `[check_in, check_out)`.
/// Callers hold the room row lock.
pub(crate) fn count_overlapping_bookings(
    conn: &mut PgConnection,
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_booking_id: Option<Uuid>,
) -> QueryResult<i64> {
    let mut query = bookings::table
        .filter(bookings::room_id.eq(room_id))
        .filter(bookings::status.ne_all(BookingStatus::terminal_strs()))
        .filter(bookings::check_in.lt(check_out))
        .filter(bookings::check_out.gt(check_in))
        .select(count_star())
        .into_boxed();

    if let Some(exclude_booking_id) = exclude_booking_id {
        query = query.filter(bookings::id.ne(exclude_booking_id));
    }

    query.get_result::<i64>(conn)
}

/// `SELECT ... FOR UPDATE` on the room; serializes every availability decision
/// for that room. `None` when the room does not exist.
pub(crate) fn lock_room(conn: &mut PgConnection, room_id: Uuid) -> QueryResult<Option<Uuid>> {
    rooms::table
        .find(room_id)
        .select(rooms::id)
        .for_update()
        .first::<Uuid>(conn)
        .optional()
}

#[async_trait]
impl AvailabilityRepository for AvailabilityPostgres {
    async fn is_room_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let available = conn.transaction::<bool, diesel::result::Error, _>(|tx| {
            if lock_room(tx, room_id)?.is_none() {
                return Ok(false);
            }
            let conflicts =
                count_overlapping_bookings(tx, room_id, check_in, check_out, exclude_booking_id)?;
            Ok(conflicts == 0)
        })?;

        Ok(available)
    }

    async fn find_conflicting_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = bookings::table
            .filter(bookings::status.ne_all(BookingStatus::terminal_strs()))
            .filter(bookings::check_in.lt(check_out))
            .filter(bookings::check_out.gt(check_in))
            .select(bookings::room_id)
            .distinct()
            .load::<Uuid>(&mut conn)?;

        Ok(results)
    }

    async fn find_blocked_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = room_blocks::table
            .filter(room_blocks::start_date.lt(check_out))
            .filter(room_blocks::end_date.gt(check_in))
            .select(room_blocks::room_id)
            .distinct()
            .load::<Uuid>(&mut conn)?;

        Ok(results)
    }

    async fn list_open_rooms(
        &self,
        search: AvailabilitySearch,
        excluded: Vec<Uuid>,
    ) -> Result<Vec<RoomDetails>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = rooms::table
            .inner_join(properties::table)
            .inner_join(room_types::table)
            .filter(rooms::is_active.eq(true))
            .filter(properties::is_active.eq(true))
            .filter(rooms::status.eq(RoomStatus::Available.as_str()))
            .select((
                RoomEntity::as_select(),
                PropertyEntity::as_select(),
                RoomTypeEntity::as_select(),
            ))
            .into_boxed();

        if !excluded.is_empty() {
            query = query.filter(rooms::id.ne_all(excluded));
        }
        if let Some(property_id) = search.property_id {
            query = query.filter(rooms::property_id.eq(property_id));
        }
        if let Some(room_type_id) = search.room_type_id {
            query = query.filter(rooms::room_type_id.eq(room_type_id));
        }

        let rows = query
            .order((properties::name.asc(), rooms::room_number.asc()))
            .load::<(RoomEntity, PropertyEntity, RoomTypeEntity)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(room, property, room_type)| RoomDetails {
                room,
                property,
                room_type,
            })
            .collect())
    }
}
