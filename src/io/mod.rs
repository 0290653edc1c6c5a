//! Input helpers.
//!
//! - price-source CSV ingest + validation (`ingest`)

pub mod ingest;

pub use ingest::*;
