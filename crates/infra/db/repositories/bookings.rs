use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, insert_into, prelude::*, result::Error as DieselError, update};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    domain::{
        entities::bookings::{BookingEntity, InsertBookingEntity},
        repositories::bookings::BookingRepository,
        value_objects::enums::booking_statuses::BookingStatus,
    },
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::bookings},
        repositories::availability::{count_overlapping_bookings, lock_room},
    },
};

/// Exclusion constraint backing the overlap check at the storage layer.
const NO_OVERLAP_CONSTRAINT: &str = "bookings_no_overlap";

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn insert_booking_if_available(
        &self,
        booking: InsertBookingEntity,
    ) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<Option<BookingEntity>, DieselError, _>(|tx| {
            if lock_room(tx, booking.room_id)?.is_none() {
                return Ok(None);
            }

            let conflicts =
                count_overlapping_bookings(tx, booking.room_id, booking.check_in, booking.check_out, None)?;
            if conflicts > 0 {
                return Ok(None);
            }

            let inserted = insert_into(bookings::table)
                .values(&booking)
                .returning(BookingEntity::as_select())
                .get_result::<BookingEntity>(tx)?;

            Ok(Some(inserted))
        });

        match result {
            Ok(inserted) => Ok(inserted),
            Err(DieselError::DatabaseError(_, info))
                if info.constraint_name() == Some(NO_OVERLAP_CONSTRAINT) =>
            {
                warn!(
                    room_id = %booking.room_id,
                    check_in = %booking.check_in,
                    check_out = %booking.check_out,
                    "bookings: overlap rejected by exclusion constraint"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = bookings::table
            .find(booking_id)
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_code(&self, booking_code: String) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = bookings::table
            .filter(bookings::booking_code.eq(booking_code))
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn transition_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let target = bookings::table
            .filter(bookings::id.eq(booking_id))
            .filter(bookings::status.eq(from.as_str()));

        let result = match to {
            BookingStatus::CheckedIn => update(target)
                .set((
                    bookings::status.eq(to.as_str()),
                    bookings::checked_in_at.eq(Some(at)),
                    bookings::updated_at.eq(at),
                ))
                .returning(BookingEntity::as_select())
                .get_result::<BookingEntity>(&mut conn)
                .optional()?,
            BookingStatus::CheckedOut => update(target)
                .set((
                    bookings::status.eq(to.as_str()),
                    bookings::checked_out_at.eq(Some(at)),
                    bookings::updated_at.eq(at),
                ))
                .returning(BookingEntity::as_select())
                .get_result::<BookingEntity>(&mut conn)
                .optional()?,
            BookingStatus::Cancelled => update(target)
                .set((
                    bookings::status.eq(to.as_str()),
                    bookings::cancelled_at.eq(Some(at)),
                    bookings::updated_at.eq(at),
                ))
                .returning(BookingEntity::as_select())
                .get_result::<BookingEntity>(&mut conn)
                .optional()?,
            _ => update(target)
                .set((
                    bookings::status.eq(to.as_str()),
                    bookings::updated_at.eq(at),
                ))
                .returning(BookingEntity::as_select())
                .get_result::<BookingEntity>(&mut conn)
                .optional()?,
        };

        Ok(result)
    }

    async fn list_pending(&self, created_before: Option<DateTime<Utc>>) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = bookings::table
            .filter(bookings::status.eq(BookingStatus::Pending.as_str()))
            .select(BookingEntity::as_select())
            .into_boxed();

        if let Some(created_before) = created_before {
            query = query.filter(bookings::created_at.lt(created_before));
        }

        let results = query
            .order(bookings::created_at.asc())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }
}
