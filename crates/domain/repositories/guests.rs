use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::guests::{GuestEntity, UpsertGuestEntity};

#[async_trait]
#[automock]
pub trait GuestRepository {
    /// Finds the guest by email and refreshes the contact fields, or creates one.
    async fn upsert_by_email(&self, guest: UpsertGuestEntity) -> Result<GuestEntity>;

    async fn find_by_id(&self, guest_id: Uuid) -> Result<Option<GuestEntity>>;
}
