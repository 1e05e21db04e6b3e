use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::notifications::InsertNotificationEntity;

/// Staff-facing notification feed.
#[async_trait]
#[automock]
pub trait NotificationRepository {
    async fn notify(&self, notification: InsertNotificationEntity) -> Result<()>;
}
