use std::net::SocketAddr;

use serde::Deserialize;

use crate::{cors::CorsConfig, health::HealthConfig, request_log::RequestLogConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Prefix every API route is mounted under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub request_log: RequestLogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            api_prefix: default_api_prefix(),
            health: HealthConfig::default(),
            cors: None,
            request_log: RequestLogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Address to bind, `127.0.0.1:8000` when unset
    pub fn listen_address_or_default(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000)))
    }
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}
