#![allow(clippy::must_use_candidate)]

pub mod cors;
pub mod errors;
pub mod health;
mod loader;
pub mod request_log;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use errors::*;
pub use health::*;
pub use loader::Validate;
pub use request_log::*;
pub use server::*;
pub use telemetry::*;

/// Top-level faultline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Service name, reported by the health document
    #[serde(default = "default_name")]
    pub name: String,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// How errors are exposed at the boundary
    #[serde(default)]
    pub errors: ErrorPolicyConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            server: ServerConfig::default(),
            errors: ErrorPolicyConfig::default(),
            telemetry: None,
        }
    }
}

fn default_name() -> String {
    "faultline".to_string()
}
