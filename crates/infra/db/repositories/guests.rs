use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::guests::{GuestEntity, UpsertGuestEntity},
        repositories::guests::GuestRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::guests},
};

pub struct GuestPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GuestPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GuestRepository for GuestPostgres {
    async fn upsert_by_email(&self, guest: UpsertGuestEntity) -> Result<GuestEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // `None` contact fields are skipped by the changeset and keep their stored value.
        let result = insert_into(guests::table)
            .values(&guest)
            .on_conflict(guests::email)
            .do_update()
            .set((&guest, guests::updated_at.eq(Utc::now())))
            .returning(GuestEntity::as_select())
            .get_result::<GuestEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, guest_id: Uuid) -> Result<Option<GuestEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = guests::table
            .find(guest_id)
            .select(GuestEntity::as_select())
            .first::<GuestEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
