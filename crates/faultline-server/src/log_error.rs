use std::error::Error as StdError;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use faultline_core::Level;
use http::Method;

use crate::error::{self, ApiError};
use crate::state::AppState;

/// Error boundary middleware
///
/// Picks up an [`ApiError`] left in the response extensions, logs it at the
/// severity it carries and replaces the response with the rendered body.
pub(crate) async fn log_error_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    let Some(err) = response.extensions_mut().remove::<ApiError>() else {
        return response;
    };

    respond(&state, &method, &path, err.get())
}

/// Render `err` and log it inside an `http_error` span
///
/// Also used by layers that fail before the request reaches the boundary.
pub(crate) fn respond(state: &AppState, method: &Method, path: &str, err: &(dyn StdError + 'static)) -> Response {
    let rendered = error::render(state, err);

    let span = tracing::info_span!("http_error", %method, %path, status = rendered.status().as_u16());
    span.in_scope(|| faultline_telemetry::record_error(err, Level::Error, "http error"));

    rendered
}
