//! Two-stone comparison (recut economics).

use crate::domain::{ComparisonResult, Quote};

/// Compare stone A's total against stone B.
///
/// `cost_percent` is A's total spread over B's weight, relative to B's
/// reference price. Undefined ratios are reported as 0.
pub fn compare(total_a: f64, total_b: f64, weight_b: f64, base_price_b: f64) -> ComparisonResult {
    let difference = total_b - total_a;

    let cost_percent = if weight_b != 0.0 && base_price_b != 0.0 {
        ((total_a / weight_b) / base_price_b - 1.0) * 100.0
    } else {
        0.0
    };

    let change_percent = if total_a != 0.0 {
        (difference / total_a) * 100.0
    } else {
        0.0
    };

    ComparisonResult {
        difference,
        cost_percent,
        change_percent,
    }
}

pub fn compare_quotes(a: &Quote, b: &Quote) -> ComparisonResult {
    compare(
        a.total_price_source_currency,
        b.total_price_source_currency,
        b.weight,
        b.base_price_per_unit,
    )
}
