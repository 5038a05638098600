use std::path::Path;

use anyhow::Context as _;

use crate::{Config, CorsConfig, ServerConfig, TelemetryConfig};

/// Consistency checks run after a configuration section is parsed
pub trait Validate {
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    fn validate(&self) -> anyhow::Result<()>;
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Self::load_with(path, |_| Ok(()))
    }

    /// Load configuration and run an application-specific check on top of
    /// the built-in validation
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or `check` rejects the result
    pub fn load_with<F>(path: &Path, check: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&Self) -> anyhow::Result<()>,
    {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;

        check(&config).context("custom config validation failed")?;

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for Config {
    fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }

        self.server.validate()?;

        if let Some(ref telemetry) = self.telemetry {
            telemetry.validate()?;
        }

        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> anyhow::Result<()> {
        let prefix = self.api_prefix.as_str();
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            anyhow::bail!("server.api_prefix must start with '/' and must not end with '/', got '{prefix}'");
        }

        if self.health.enabled && !self.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/', got '{}'", self.health.path);
        }

        if let Some(bad) = self.request_log.skip_prefixes.iter().find(|p| !p.starts_with('/')) {
            anyhow::bail!("server.request_log.skip_prefixes entries must start with '/', got '{bad}'");
        }

        if let Some(ref cors) = self.cors {
            cors.validate()?;
        }

        Ok(())
    }
}

impl Validate for CorsConfig {
    fn validate(&self) -> anyhow::Result<()> {
        if self.credentials && (self.origins.is_any() || self.methods.is_any() || self.headers.is_any()) {
            anyhow::bail!("server.cors.credentials cannot be combined with wildcard origins, methods or headers");
        }

        for origin in self.origins.values() {
            http::HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("invalid CORS origin '{origin}': {e}"))?;
        }

        for method in self.methods.values() {
            http::Method::from_bytes(method.as_bytes())
                .map_err(|e| anyhow::anyhow!("invalid CORS method '{method}': {e}"))?;
        }

        for header in self.headers.values().iter().chain(&self.expose_headers) {
            http::HeaderName::from_bytes(header.as_bytes())
                .map_err(|e| anyhow::anyhow!("invalid CORS header '{header}': {e}"))?;
        }

        Ok(())
    }
}

impl Validate for TelemetryConfig {
    fn validate(&self) -> anyhow::Result<()> {
        if self.service_name.trim().is_empty() {
            anyhow::bail!("telemetry.service_name must not be empty");
        }

        if self.log_filter.trim().is_empty() {
            anyhow::bail!("telemetry.log_filter must not be empty");
        }

        Ok(())
    }
}
