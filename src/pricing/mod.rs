//! Price resolution and reconciliation.
//!
//! Responsibilities:
//!
//! - hold the reference table and answer band lookups (`table`)
//! - map a stone weight to its search weight (`bucket`)
//! - resolve a stone to a base price (`resolver`)
//! - reconcile discount and absolute prices (`reconcile`)
//! - compare two quotes (`compare`)

pub mod bucket;
pub mod compare;
pub mod reconcile;
pub mod resolver;
pub mod table;

pub use bucket::*;
pub use compare::*;
pub use reconcile::*;
pub use resolver::*;
pub use table::*;
