//! Capabilities the chain walker and translator dispatch on
//!
//! Instead of matching on concrete error types at every call site, an error
//! is inspected once through [`probe`], which reports which capability it
//! offers: a structured [`Error`] value, or a foreign protocol status.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::{Error, Level, ProtocolCode};

/// Exposes a `(code, protocol_code)` identity
pub trait Coded {
    fn code(&self) -> i32;
    fn protocol_code(&self) -> ProtocolCode;
}

/// Exposes a status from the RPC protocol space
pub trait ProtocolStatus {
    fn protocol_code(&self) -> ProtocolCode;
    fn status_message(&self) -> &str;
}

/// Exposes the severity the failure should be logged at
pub trait Leveled {
    fn level(&self) -> Level;
}

impl Coded for Error {
    fn code(&self) -> i32 {
        Self::code(self)
    }

    fn protocol_code(&self) -> ProtocolCode {
        Self::protocol_code(self)
    }
}

impl Leveled for Error {
    fn level(&self) -> Level {
        Self::level(self)
    }
}

impl ProtocolStatus for tonic::Status {
    fn protocol_code(&self) -> ProtocolCode {
        self.code().into()
    }

    fn status_message(&self) -> &str {
        self.message()
    }
}

/// What a single error in a chain is able to report
#[derive(Clone, Copy)]
pub enum Probe<'a> {
    /// A structured error value
    Value(&'a Error),
    /// A foreign error carrying a protocol status
    Status(&'a dyn ProtocolStatus),
}

impl Probe<'_> {
    /// Whether this probe identifies the same failure as `candidate`
    ///
    /// Foreign statuses only carry a protocol code, so only that is compared.
    pub fn matches(self, candidate: &Error) -> bool {
        match self {
            Self::Value(value) => {
                Coded::code(value) == candidate.code() && Coded::protocol_code(value) == candidate.protocol_code()
            }
            Self::Status(status) => status.protocol_code() == candidate.protocol_code(),
        }
    }
}

/// Inspect one error (without following its chain)
pub fn probe<'a>(err: &'a (dyn StdError + 'static)) -> Option<Probe<'a>> {
    if let Some(value) = as_value(err) {
        return Some(Probe::Value(value));
    }

    err.downcast_ref::<tonic::Status>()
        .map(|status| Probe::Status(status as &dyn ProtocolStatus))
}

/// Recognise an error value held directly or behind a pointer
pub fn as_value<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    err.downcast_ref::<Error>()
        .or_else(|| err.downcast_ref::<Box<Error>>().map(|boxed| &**boxed))
        .or_else(|| err.downcast_ref::<Arc<Error>>().map(|shared| &**shared))
}

/// Severity exposed by this error itself
pub fn level_of(err: &(dyn StdError + 'static)) -> Option<Level> {
    as_value(err).map(Leveled::level)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn probes_value_by_value_and_by_pointer() {
        let err = Error::new(404, "not found", Level::Info);
        let boxed = Box::new(err.clone());
        let shared = Arc::new(err.clone());

        assert!(matches!(probe(&err), Some(Probe::Value(v)) if *v == err));
        assert!(matches!(probe(&boxed), Some(Probe::Value(v)) if *v == err));
        assert!(matches!(probe(&shared), Some(Probe::Value(v)) if *v == err));
    }

    #[test]
    fn probes_foreign_status() {
        let status = tonic::Status::not_found("missing");
        let Some(Probe::Status(found)) = probe(&status) else {
            panic!("status not recognised");
        };
        assert_eq!(found.protocol_code(), ProtocolCode::NOT_FOUND);
        assert_eq!(found.status_message(), "missing");
    }

    #[test]
    fn plain_errors_expose_nothing() {
        let err = io::Error::other("boom");
        assert!(probe(&err).is_none());
        assert!(level_of(&err).is_none());
    }

    #[test]
    fn status_matches_on_protocol_code_only() {
        let mut candidate = Error::new(70001, "lookup failed", Level::Info);
        candidate.set_protocol_code(ProtocolCode::NOT_FOUND);

        let status = tonic::Status::not_found("anything");
        assert!(probe(&status).is_some_and(|p| p.matches(&candidate)));

        let other = tonic::Status::internal("anything");
        assert!(!probe(&other).is_some_and(|p| p.matches(&candidate)));
    }
}
