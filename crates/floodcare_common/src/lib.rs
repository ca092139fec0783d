//! FloodCare Common - Shared types and the triage/sync pipeline
//!
//! Everything the service and the CLI agree on lives here: the report and
//! announcement model, the risk classifier, the local cache, the spreadsheet
//! gateway, the in-memory store and the polling sync loop.

pub mod advice;
pub mod api;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod intake;
pub mod merge;
pub mod model_client;
pub mod paths;
pub mod session;
pub mod sheet_format;
pub mod store;
pub mod sync;
pub mod types;

pub use error::FloodError;
pub use types::*;

/// Crate version, shared by the service and CLI banners
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
