use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into};
use std::sync::Arc;

use crate::{
    domain::{
        entities::notifications::InsertNotificationEntity,
        repositories::notifications::NotificationRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::notifications},
};

pub struct NotificationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl NotificationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl NotificationRepository for NotificationPostgres {
    async fn notify(&self, notification: InsertNotificationEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(notifications::table)
            .values(&notification)
            .execute(&mut conn)?;

        Ok(())
    }
}
