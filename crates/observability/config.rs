use std::env;
use tracing::Level;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) stage: String,
    pub(crate) component: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OpsAlertConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Debug, Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) ops_alert: Option<OpsAlertConfig>,
    /// Logged once the subscriber is installed.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    fn from_lookup(component: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let component = component.trim().to_string();

        let service_context = ServiceContext {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            stage: non_empty("STAGE").unwrap_or_else(|| "unknown".to_string()),
            component,
        };

        let mut warnings = Vec::new();
        let ops_alert = non_empty("OPS_ALERT_WEBHOOK_URL").and_then(|raw| match Url::parse(&raw) {
            Ok(webhook_url) => {
                let min_level = match non_empty("OPS_ALERT_LEVEL") {
                    None => Level::ERROR,
                    Some(raw_level) => parse_level(&raw_level).unwrap_or_else(|| {
                        warnings.push(format!(
                            "OPS_ALERT_LEVEL is invalid (value: {raw_level}); using ERROR"
                        ));
                        Level::ERROR
                    }),
                };
                Some(OpsAlertConfig {
                    webhook_url,
                    min_level,
                })
            }
            Err(err) => {
                // The URL embeds a secret, so only the parse error is reported.
                warnings.push(format!(
                    "OPS_ALERT_WEBHOOK_URL is invalid; ops alerts disabled (parse error: {err})"
                ));
                None
            }
        });

        Self {
            service_context,
            ops_alert,
            warnings,
        }
    }
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ObservabilityConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ObservabilityConfig::from_lookup("backend", |key| vars.get(key).cloned())
    }

    #[test]
    fn alerts_are_off_without_a_webhook() {
        let config = config(&[("STAGE", "production")]);
        assert!(config.ops_alert.is_none());
        assert!(config.warnings.is_empty());
        assert_eq!(config.service_context.service_name, "backend");
        assert_eq!(config.service_context.stage, "production");
    }

    #[test]
    fn level_defaults_to_error_and_bad_values_warn() {
        let config = config(&[
            ("OPS_ALERT_WEBHOOK_URL", "https://chat.example/hooks/abc"),
            ("OPS_ALERT_LEVEL", "loud"),
        ]);
        assert_eq!(config.ops_alert.map(|a| a.min_level), Some(Level::ERROR));
        assert_eq!(config.warnings.len(), 1);

        let config = self::config(&[
            ("OPS_ALERT_WEBHOOK_URL", "https://chat.example/hooks/abc"),
            ("OPS_ALERT_LEVEL", "warn"),
        ]);
        assert_eq!(config.ops_alert.map(|a| a.min_level), Some(Level::WARN));
    }

    #[test]
    fn invalid_webhook_disables_alerts_without_echoing_the_url() {
        let config = config(&[("OPS_ALERT_WEBHOOK_URL", "not a url/secret-123")]);
        assert!(config.ops_alert.is_none());
        assert!(!config.warnings[0].contains("secret-123"));
    }
}
