use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

use super::{EmailMessage, EmailSender};

/// Transactional e-mail API client (`POST {api_url}` with a bearer key).
pub struct HttpEmailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpEmailClient {
    pub fn new(api_url: String, api_key: String, from_address: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_url,
            api_key,
            from_address,
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let body = SendEmailBody {
            from: &self.from_address,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let resp = self
            .http
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let response_body = resp.text().await.unwrap_or_default();
        error!(
            status = %status,
            response_body = %response_body,
            subject = %message.subject,
            "email: provider rejected message"
        );
        anyhow::bail!("email provider returned status {status}");
    }
}
