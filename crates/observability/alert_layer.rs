use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

use super::{
    alert_queue::{AlertQueue, OpsAlert},
    config::ServiceContext,
};

const REDACTED: &str = "[REDACTED]";

/// Forwards events at or above `min_level` to the ops alert queue.
pub(crate) struct OpsAlertLayer {
    queue: AlertQueue,
    service_context: ServiceContext,
    min_level: Level,
}

impl OpsAlertLayer {
    pub(crate) fn new(queue: AlertQueue, service_context: ServiceContext, min_level: Level) -> Self {
        Self {
            queue,
            service_context,
            min_level,
        }
    }
}

#[derive(Default)]
struct AlertFieldVisitor {
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl AlertFieldVisitor {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
            return;
        }
        let value = if is_sensitive_field(field.name()) {
            REDACTED.to_string()
        } else {
            value
        };
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for AlertFieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

impl<S> Layer<S> for OpsAlertLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering in tracing: ERROR < WARN < INFO.
        if *metadata.level() > self.min_level {
            return;
        }

        let mut visitor = AlertFieldVisitor::default();
        event.record(&mut visitor);

        let span_path = ctx
            .event_span(event)
            .map(|span| {
                span.scope()
                    .from_root()
                    .map(|s| s.metadata().name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        self.queue.push(OpsAlert {
            level: *metadata.level(),
            at: Utc::now(),
            service_name: self.service_context.service_name.clone(),
            stage: self.service_context.stage.clone(),
            component: self.service_context.component.clone(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
            span_path,
        });
    }
}

/// Credentials and guest personal data never leave the process in an alert.
fn is_sensitive_field(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    [
        "secret",
        "token",
        "password",
        "authorization",
        "api_key",
        "webhook",
        "email",
        "phone",
        "id_number",
    ]
    .iter()
    .any(|needle| name.contains(needle))
}
