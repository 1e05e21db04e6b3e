mod alert_layer;
mod alert_queue;
mod config;

use alert_layer::OpsAlertLayer;
use alert_queue::{AlertQueue, WebhookAlertSink};
use anyhow::Result;
use config::ObservabilityConfig;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber: env-filtered fmt output with local RFC3339
/// timestamps, plus ops alerts when `OPS_ALERT_WEBHOOK_URL` is configured.
/// Must run inside a tokio runtime when alerts are enabled.
pub fn init_observability(component: &str) -> Result<()> {
    let mut config = ObservabilityConfig::from_env(component);

    let alert_layer = match config.ops_alert.as_ref() {
        Some(ops_alert) => match WebhookAlertSink::new(ops_alert.webhook_url.clone()) {
            Ok(sink) => {
                let queue = AlertQueue::spawn(Arc::new(sink));
                Some(
                    OpsAlertLayer::new(queue, config.service_context.clone(), ops_alert.min_level)
                        .with_filter(LevelFilter::from_level(ops_alert.min_level)),
                )
            }
            Err(err) => {
                config
                    .warnings
                    .push(format!("ops alert client could not be built; alerts disabled ({err})"));
                None
            }
        },
        None => None,
    };
    let alerts_enabled = alert_layer.is_some();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    let context = &config.service_context;
    for warning in &config.warnings {
        warn!(
            service = %context.service_name,
            stage = %context.stage,
            component = %context.component,
            warning = %warning,
            "observability: config warning"
        );
    }

    info!(
        service = %context.service_name,
        stage = %context.stage,
        component = %context.component,
        ops_alerts = alerts_enabled,
        "observability: initialized"
    );

    Ok(())
}
