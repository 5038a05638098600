use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// `tracing-subscriber` env-filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Output format of the log stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
}

fn default_service_name() -> String {
    "faultline".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}
