use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{Level, warn};
use url::Url;

const QUEUE_CAPACITY: usize = 256;
const MAX_ALERT_CHARS: usize = 3_000;

#[derive(Debug, Clone)]
pub(crate) struct OpsAlert {
    pub(crate) level: Level,
    pub(crate) at: DateTime<Utc>,
    pub(crate) service_name: String,
    pub(crate) stage: String,
    pub(crate) component: String,
    pub(crate) target: String,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) span_path: Vec<String>,
}

impl OpsAlert {
    pub(crate) fn render(&self) -> String {
        let mut text = format!(
            "[{}] {} ({}/{}) {} at {}",
            self.level,
            self.service_name,
            self.stage,
            self.component,
            self.target,
            self.at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            text.push('\n');
            text.push_str(message.trim());
        }
        if !self.span_path.is_empty() {
            text.push_str(&format!("\nin {}", self.span_path.join(" > ")));
        }
        for (key, value) in &self.fields {
            text.push_str(&format!("\n{key}: {value}"));
        }

        if text.chars().count() > MAX_ALERT_CHARS {
            text = text.chars().take(MAX_ALERT_CHARS).collect();
            text.push_str("\n(truncated)");
        }
        text
    }
}

#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &OpsAlert) -> Result<()>;
}

/// Posts `{"text": ...}` to a chat incoming-webhook URL.
pub(crate) struct WebhookAlertSink {
    webhook_url: Url,
    client: reqwest::Client,
}

impl WebhookAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn deliver(&self, alert: &OpsAlert) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "text": alert.render() }))
            .send()
            .await
            // reqwest errors carry the URL, which holds the webhook secret.
            .map_err(|err| anyhow!("ops alert delivery failed (timeout: {})", err.is_timeout()))?;

        if !response.status().is_success() {
            return Err(anyhow!("ops alert webhook answered {}", response.status()));
        }
        Ok(())
    }
}

/// Bounded hand-off between the tracing layer and the delivering task.
#[derive(Clone)]
pub(crate) struct AlertQueue {
    tx: mpsc::Sender<OpsAlert>,
}

impl AlertQueue {
    pub(crate) fn spawn(sink: Arc<dyn AlertSink>) -> Self {
        let (tx, mut rx) = mpsc::channel::<OpsAlert>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(err) = sink.deliver(&alert).await {
                    warn!(error = %err, "observability: ops alert not delivered");
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn push(&self, alert: OpsAlert) {
        if let Err(err) = self.tx.try_send(alert) {
            let reason = match err {
                mpsc::error::TrySendError::Full(_) => "full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            };
            warn!(reason, "observability: ops alert queue rejected event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn alert(message: &str) -> OpsAlert {
        OpsAlert {
            level: Level::ERROR,
            at: Utc::now(),
            service_name: "staydesk".to_string(),
            stage: "production".to_string(),
            component: "backend".to_string(),
            target: "backend::usecases::payments".to_string(),
            message: Some(message.to_string()),
            fields: BTreeMap::from([("booking_id".to_string(), "42".to_string())]),
            span_path: vec!["request".to_string()],
        }
    }

    #[test]
    fn render_includes_context_fields_and_truncates() {
        let text = alert("payments: settlement failed").render();
        assert!(text.starts_with("[ERROR] staydesk (production/backend)"));
        assert!(text.contains("payments: settlement failed"));
        assert!(text.contains("booking_id: 42"));
        assert!(text.contains("in request"));

        let long = alert(&"x".repeat(MAX_ALERT_CHARS * 2)).render();
        assert!(long.ends_with("(truncated)"));
    }

    struct RecordingSink {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn deliver(&self, alert: &OpsAlert) -> Result<()> {
            self.delivered
                .lock()
                .unwrap()
                .push(alert.message.clone().unwrap_or_default());
            Ok(())
        }
    }

    #[tokio::test]
    async fn queued_alerts_reach_the_sink() {
        let sink = Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        });
        let queue = AlertQueue::spawn(sink.clone());
        queue.push(alert("first"));

        for _ in 0..50 {
            if !sink.delivered.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.delivered.lock().unwrap().as_slice(), ["first".to_string()]);
    }
}
