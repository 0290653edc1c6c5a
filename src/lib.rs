//! `diamond-price-xpert` library crate.
//!
//! The binary (`dpx`) is a thin wrapper around this library so that:
//!
//! - pricing logic is testable without spawning processes
//! - the CLI and the TUI share one quote pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod pricing;
pub mod report;
pub mod tui;
