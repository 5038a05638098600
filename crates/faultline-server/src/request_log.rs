use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use faultline_config::RequestLogConfig;
use faultline_core::Sentinel;
use http::header;

use crate::log_error;
use crate::state::AppState;

const BODY_TOO_LARGE: &str = "exceeded the maximum data limit";

/// State for [`request_log_middleware`]
#[derive(Clone)]
pub(crate) struct RequestLogState {
    pub config: Arc<RequestLogConfig>,
    pub app: AppState,
}

/// Logs each request and its response, except for skipped path prefixes
///
/// Runs outside the error boundary, so a body that cannot be read is
/// rendered and logged here.
pub(crate) async fn request_log_middleware(
    State(state): State<RequestLogState>,
    request: Request,
    next: Next,
) -> Response {
    let config = &state.config;
    if config.skips(request.uri().path()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let content_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let (parts, body) = request.into_parts();

    let (body, printable) = match content_length {
        Some(length) if length <= config.max_body_bytes => match axum::body::to_bytes(body, config.max_body_bytes).await {
            Ok(bytes) => {
                let printable = String::from_utf8_lossy(&bytes).into_owned();
                (Body::from(bytes), printable)
            }
            Err(e) => {
                let err = Sentinel::RequestParams
                    .standard_error()
                    .with_reason("request body could not be read")
                    .with_message(e.to_string());
                return log_error::respond(&state.app, &method, &path, &err);
            }
        },
        Some(_) => (body, BODY_TOO_LARGE.to_owned()),
        None => (body, String::new()),
    };

    tracing::info!(
        %method,
        uri = %path,
        query = parts.uri.query().unwrap_or_default(),
        content_type = parts.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        content_length,
        user_agent = parts.headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()),
        body = %printable,
        "http request"
    );

    let response = next.run(Request::from_parts(parts, body)).await;

    tracing::info!(
        status = response.status().as_u16(),
        %method,
        uri = %path,
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "http response"
    );

    response
}
