//! Tracing configuration types.

use serde::Deserialize;

/// Configuration for the logging subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Service name stamped on the startup event.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Log level filter (e.g. "info", "debug", "ctxlog=trace,info").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format for the stderr layer.
    #[serde(default)]
    pub format: LogFormat,
}

/// Line format for emitted events.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_service_name() -> String {
    "ctxlog".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: TracingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.service_name, "ctxlog");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn format_is_lowercase() {
        let config: TracingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert!(serde_json::from_str::<TracingConfig>(r#"{"format": "Json"}"#).is_err());
    }
}
