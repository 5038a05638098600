#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Structured errors that travel unchanged from where a failure happens to
//! the service boundary, where they are broken down into a wire response.

pub mod capability;
pub mod catalog;
pub mod chain;
mod error;
mod explode;
mod gateway;
mod level;
pub mod pagination;
mod status;

pub use catalog::{Band, Catalog, CatalogError, Domain, Entry, Sentinel};
pub use error::{Cause, DEFAULT_ERROR_CODE, Error, SUCCESS_CODE};
pub use explode::{Exploded, Translator};
pub use gateway::GatewayTable;
pub use level::Level;
pub use status::ProtocolCode;
