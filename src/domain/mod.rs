//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - grade and shape vocabularies (`Color`, `Clarity`, `Shape`, `ShapeCode`)
//! - price-table rows (`PriceBandRecord`)
//! - per-stone inputs (`StoneSpec`, `DiscountToggle`, `PriceInputs`)
//! - reconciled outputs (`Quote`, `ComparisonResult`)

pub mod types;

pub use types::*;
