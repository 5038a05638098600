use std::error::Error as StdError;
use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use faultline_core::capability::{self, Probe};
use faultline_core::{Catalog, Domain, Error, ProtocolCode, Sentinel, chain};
use http::StatusCode;
use serde::Serialize;

use crate::state::AppState;

/// Error returned from a handler
///
/// Converting to a response only records the error in the response
/// extensions; the error boundary middleware turns it into the JSON body,
/// picks the HTTP status and logs it.
#[derive(Debug, Clone)]
pub struct ApiError(Arc<dyn StdError + Send + Sync + 'static>);

impl ApiError {
    pub fn from_boxed(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self(Arc::from(err))
    }

    /// Keep an `anyhow` chain intact so structured values beneath its
    /// context layers are still found
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        Self::from_boxed(err.into())
    }

    pub fn get(&self) -> &(dyn StdError + 'static) {
        &*self.0
    }
}

impl<E> From<E> for ApiError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self(Arc::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Wire shape of an error response
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub code: i32,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Build the response for `err` according to the configured policy
pub(crate) fn render(state: &AppState, err: &(dyn StdError + 'static)) -> Response {
    let exploded = if state.policy.gateway_remap {
        state.translator.explode_external(Some(err))
    } else {
        state.translator.explode(Some(err))
    };

    let detail = (state.policy.expose_detail && !exploded.detail.is_empty()).then_some(exploded.detail);

    let body = ErrorBody {
        code: exploded.code,
        reason: exploded.reason,
        detail,
    };

    (http_status(&state.catalog, err), Json(body)).into_response()
}

/// HTTP status for an error chain
///
/// Resolution follows the translator: a top-level protocol status maps by
/// its code, otherwise the first structured value decides.
pub(crate) fn http_status(catalog: &Catalog, err: &(dyn StdError + 'static)) -> StatusCode {
    if let Some(Probe::Status(status)) = capability::probe(err) {
        return protocol_status(status.protocol_code());
    }

    chain::find_error(err).map_or(StatusCode::INTERNAL_SERVER_ERROR, |value| value_status(catalog, value))
}

fn value_status(catalog: &Catalog, value: &Error) -> StatusCode {
    let entry = catalog.by_code(value.code()).map(|(entry, _)| entry);

    match entry {
        Some(entry) if entry.sentinel == Sentinel::ResourceNotFound => StatusCode::NOT_FOUND,
        Some(entry) if entry.domain == Domain::Auth => match entry.sentinel {
            Sentinel::Forbidden | Sentinel::Unauthorized => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        },
        _ if chain::is_biz_fault(value) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const fn protocol_status(code: ProtocolCode) -> StatusCode {
    match code {
        ProtocolCode::INVALID_ARGUMENT | ProtocolCode::FAILED_PRECONDITION | ProtocolCode::OUT_OF_RANGE => {
            StatusCode::BAD_REQUEST
        }
        ProtocolCode::UNAUTHENTICATED => StatusCode::UNAUTHORIZED,
        ProtocolCode::PERMISSION_DENIED => StatusCode::FORBIDDEN,
        ProtocolCode::NOT_FOUND => StatusCode::NOT_FOUND,
        ProtocolCode::ALREADY_EXISTS | ProtocolCode::ABORTED => StatusCode::CONFLICT,
        ProtocolCode::RESOURCE_EXHAUSTED => StatusCode::TOO_MANY_REQUESTS,
        ProtocolCode::UNIMPLEMENTED => StatusCode::NOT_IMPLEMENTED,
        ProtocolCode::UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
        ProtocolCode::DEADLINE_EXCEEDED => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
