use std::any::Any;

use axum::body::Body;
use axum::response::IntoResponse;
use faultline_core::{Error, Level, Sentinel};
use http::Response;

use crate::error::ApiError;

/// A handler panicked while serving the request
#[derive(Debug, thiserror::Error)]
#[error("handler panicked: {0}")]
pub(crate) struct Panicked(String);

impl Panicked {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()))
            .unwrap_or_else(|| "unknown panic payload".to_owned());
        Self(message)
    }
}

/// Turn a caught panic into an unknown-error response for the error boundary
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let unknown = Sentinel::Unknown.standard_entry();
    let err = Error::new(unknown.code, unknown.reason, Level::Critical).wrap(Panicked::from_payload(&*payload));

    ApiError::from(err).into_response()
}
