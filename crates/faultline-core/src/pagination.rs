//! Paging helpers shared by listing endpoints
//!
//! Invalid paging input is reported as [`Sentinel::IllegalArgument`], so it
//! reaches clients as a business fault.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Sentinel};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Opaque position token handed to clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encode `value` as base64 JSON
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value).map_err(|e| Sentinel::InternalServer.standard_error().wrap(e))?;
        Ok(Self(STANDARD_NO_PAD.encode(json)))
    }

    /// Decode the position back; an empty cursor means "from the start"
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, Error> {
        if self.is_empty() {
            return Ok(None);
        }

        let bytes = STANDARD_NO_PAD.decode(&self.0).map_err(|e| invalid_cursor().wrap(e))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| invalid_cursor().wrap(e))?;
        Ok(Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn invalid_cursor() -> Error {
    Sentinel::IllegalArgument
        .standard_error()
        .with_reason("specified cursor is invalid")
}

/// Cursor-based page request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorPagination {
    pub after: Cursor,
    pub limit: i64,
}

impl CursorPagination {
    /// Requested limit, clamped to `1..=MAX_PAGE_SIZE`
    pub fn safe_limit(&self) -> u64 {
        match u64::try_from(self.limit) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(limit) => limit.min(MAX_PAGE_SIZE),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.limit < 0 {
            return Err(Sentinel::IllegalArgument
                .standard_error()
                .with_reason("limit must be greater than or equal to 0"));
        }

        if u64::try_from(self.limit).is_ok_and(|limit| limit > MAX_PAGE_SIZE) {
            return Err(Sentinel::IllegalArgument
                .standard_error()
                .with_reason_fmt(format_args!("limit must be less than or equal to {MAX_PAGE_SIZE}")));
        }

        Ok(())
    }
}

/// Cursor-based page envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage {
    #[serde(rename = "self")]
    pub self_cursor: Cursor,
    pub next: Cursor,
    pub limit: u64,
}

/// Page-number based request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitOffsetPagination {
    pub page: u64,
    pub page_size: u64,
}

impl LimitOffsetPagination {
    pub const fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// One-based page number
    pub const fn page(&self) -> u64 {
        if self.page <= 1 { 1 } else { self.page }
    }

    /// Effective page size
    ///
    /// Zero falls back to [`DEFAULT_PAGE_SIZE`]; anything above 100 is
    /// raised to [`MAX_PAGE_SIZE`].
    pub const fn page_size(&self) -> u64 {
        match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            size if size > 100 => MAX_PAGE_SIZE,
            size => size,
        }
    }

    pub const fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    /// Number of pages needed for `total` items, never less than one
    pub const fn total_pages(&self, total: u64) -> u64 {
        if total == 0 {
            return 1;
        }
        total.div_ceil(self.page_size())
    }

    /// Following page, or the current one when it is the last
    pub const fn next_page(&self, total: u64) -> u64 {
        let page = self.page();
        if page >= self.total_pages(total) { page } else { page + 1 }
    }
}
