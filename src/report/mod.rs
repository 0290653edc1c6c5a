//! Reporting utilities: quote summaries, comparisons and price-table diagnostics.

pub mod format;

pub use format::*;
