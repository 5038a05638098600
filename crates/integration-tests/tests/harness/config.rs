//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use faultline_config::{Config, CorsConfig, ErrorPolicyConfig, HealthConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Mount the API somewhere other than `/api/v1`
    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.config.server.api_prefix = prefix.to_owned();
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Set the boundary error policy
    pub fn with_error_policy(mut self, policy: ErrorPolicyConfig) -> Self {
        self.config.errors = policy;
        self
    }

    /// Report a release id in the health document
    pub fn with_release_id(mut self, release_id: &str) -> Self {
        self.config.server.health.release_id = Some(release_id.to_owned());
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
