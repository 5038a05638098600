use std::fmt;

use serde::{Deserialize, Serialize};

/// Status code in the RPC status-code space
///
/// The standard codes occupy `0..=16`. Catalog entries reuse their display
/// code here (e.g. `10000`), so this is an open numeric space rather than an
/// enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolCode(u32);

impl ProtocolCode {
    pub const OK: Self = Self(0);
    pub const CANCELLED: Self = Self(1);
    pub const UNKNOWN: Self = Self(2);
    pub const INVALID_ARGUMENT: Self = Self(3);
    pub const DEADLINE_EXCEEDED: Self = Self(4);
    pub const NOT_FOUND: Self = Self(5);
    pub const ALREADY_EXISTS: Self = Self(6);
    pub const PERMISSION_DENIED: Self = Self(7);
    pub const RESOURCE_EXHAUSTED: Self = Self(8);
    pub const FAILED_PRECONDITION: Self = Self(9);
    pub const ABORTED: Self = Self(10);
    pub const OUT_OF_RANGE: Self = Self(11);
    pub const UNIMPLEMENTED: Self = Self(12);
    pub const INTERNAL: Self = Self(13);
    pub const UNAVAILABLE: Self = Self(14);
    pub const DATA_LOSS: Self = Self(15);
    pub const UNAUTHENTICATED: Self = Self(16);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Derive the protocol code from a display code
    ///
    /// Negative display codes wrap around, as they do in the `u32` wire space.
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_display(code: i32) -> Self {
        Self(code as u32)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Numeric value as a display code
    pub fn as_i32(self) -> i32 {
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }

    /// Whether this is one of the standard RPC codes
    pub const fn is_standard(self) -> bool {
        self.0 <= Self::UNAUTHENTICATED.0
    }
}

impl From<u32> for ProtocolCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl From<tonic::Code> for ProtocolCode {
    fn from(code: tonic::Code) -> Self {
        Self(i32::from(code).unsigned_abs())
    }
}

impl fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_tonic_codes() {
        assert_eq!(ProtocolCode::from(tonic::Code::Ok), ProtocolCode::OK);
        assert_eq!(ProtocolCode::from(tonic::Code::NotFound), ProtocolCode::NOT_FOUND);
        assert_eq!(ProtocolCode::from(tonic::Code::Unauthenticated), ProtocolCode::UNAUTHENTICATED);
    }

    #[test]
    fn display_code_maps_numerically() {
        assert_eq!(ProtocolCode::from_display(10000).get(), 10000);
        assert_eq!(ProtocolCode::from_display(-1).get(), u32::MAX);
        assert!(!ProtocolCode::from_display(10000).is_standard());
        assert!(ProtocolCode::INTERNAL.is_standard());
    }

    #[test]
    fn oversized_codes_saturate_as_display() {
        assert_eq!(ProtocolCode::new(u32::MAX).as_i32(), i32::MAX);
        assert_eq!(ProtocolCode::NOT_FOUND.as_i32(), 5);
    }
}
