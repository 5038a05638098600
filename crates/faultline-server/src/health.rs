use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use faultline_config::Config;
use http::{HeaderValue, StatusCode, header};
use serde::Serialize;

const HEALTH_CONTENT_TYPE: &str = "application/health+json";

/// Health document in the `application/health+json` format
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthDocument {
    status: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_id: Option<String>,
    description: String,
}

impl HealthDocument {
    pub fn from_config(config: &Config) -> Self {
        let health = &config.server.health;
        Self {
            status: "pass",
            version: "1",
            release_id: health.release_id.clone(),
            description: health
                .description
                .clone()
                .unwrap_or_else(|| format!("health of {} service", config.name)),
        }
    }
}

/// Health check handler
pub(crate) async fn health_handler(State(document): State<Arc<HealthDocument>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(HEALTH_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("max-age=3600")),
        ],
        Json(document.as_ref().clone()),
    )
}
