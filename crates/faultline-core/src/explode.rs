use std::error::Error as StdError;

use serde::Serialize;

use crate::capability::{self, Probe};
use crate::{Error, GatewayTable, ProtocolCode, SUCCESS_CODE, chain};

/// Uniform view of an outcome at a service boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exploded {
    /// Display code for the response body
    pub code: i32,
    /// Status in the RPC protocol space
    pub protocol_code: ProtocolCode,
    /// User-facing reason
    pub reason: String,
    /// Diagnostic detail; only exposed when policy allows
    pub detail: String,
}

impl Exploded {
    pub fn success() -> Self {
        Self {
            code: SUCCESS_CODE,
            protocol_code: ProtocolCode::OK,
            reason: "success".to_owned(),
            detail: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE && self.protocol_code == ProtocolCode::OK
    }

    /// Apply gateway remapping to the display code
    #[must_use]
    pub fn remapped(mut self, table: &GatewayTable) -> Self {
        self.code = table.remap(self.code);
        self
    }

    fn from_value(value: &Error) -> Self {
        Self {
            code: value.code(),
            protocol_code: value.protocol_code(),
            reason: value.reason().to_owned(),
            detail: value.detail().into_owned(),
        }
    }

    fn fallback(unknown: &Error, err: &(dyn StdError + 'static)) -> Self {
        Self {
            code: unknown.code(),
            protocol_code: unknown.protocol_code(),
            reason: unknown.reason().to_owned(),
            detail: err.to_string(),
        }
    }
}

/// Reduces arbitrary errors to [`Exploded`] at the service boundary
#[derive(Debug, Clone)]
pub struct Translator {
    unknown: Error,
    gateway: GatewayTable,
}

impl Translator {
    /// `unknown` is reported for errors with no recognisable code
    pub const fn new(unknown: Error, gateway: GatewayTable) -> Self {
        Self { unknown, gateway }
    }

    pub const fn unknown(&self) -> &Error {
        &self.unknown
    }

    pub const fn gateway(&self) -> &GatewayTable {
        &self.gateway
    }

    /// Break an outcome down into code, protocol code, reason and detail
    ///
    /// An [`Error`] value is recognised before any unwrapping, so a value
    /// wrapping a foreign status reports its own code rather than the
    /// cause's. The display code is never remapped here; see
    /// [`Translator::explode_external`].
    pub fn explode(&self, err: Option<&(dyn StdError + 'static)>) -> Exploded {
        let Some(err) = err else {
            return Exploded::success();
        };

        match capability::probe(err) {
            Some(Probe::Value(value)) => return Exploded::from_value(value),
            Some(Probe::Status(status)) => {
                return Exploded {
                    code: status.protocol_code().as_i32(),
                    protocol_code: status.protocol_code(),
                    reason: status.status_message().to_owned(),
                    detail: err.to_string(),
                };
            }
            None => {}
        }

        chain::iter(err)
            .skip(1)
            .find_map(capability::as_value)
            .map_or_else(|| Exploded::fallback(&self.unknown, err), Exploded::from_value)
    }

    /// [`Translator::explode`] followed by gateway remapping
    pub fn explode_external(&self, err: Option<&(dyn StdError + 'static)>) -> Exploded {
        self.explode(err).remapped(&self.gateway)
    }
}
