pub mod email_client;
pub mod templates;

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound e-mail capability; failures are reported, never retried here.
#[async_trait]
#[automock]
pub trait EmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}
