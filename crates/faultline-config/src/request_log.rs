use serde::Deserialize;

/// Per-request access logging
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestLogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Path prefixes that are never logged
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
    /// Longest request body recorded in the log, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_prefixes: default_skip_prefixes(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl RequestLogConfig {
    /// Whether requests to `path` are excluded from logging
    pub fn skips(&self, path: &str) -> bool {
        self.skip_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_skip_prefixes() -> Vec<String> {
    vec!["/healthz".to_string()]
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_body_bytes() -> usize {
    1024
}
