//! Weight bucketing.
//!
//! The reference table only publishes discrete per-carat tiers above certain
//! weights, so large stones are searched at a round-number tier instead of
//! their exact weight.

/// Tier used for bulk pricing and for the 6-10 ct band.
pub const FIVE_CARAT_TIER: f64 = 5.00;
/// Tier used for stones of 10 ct and above.
pub const TEN_CARAT_TIER: f64 = 10.00;
/// Lower edge of the band that is always searched at the 5 ct tier.
pub const SIX_CARAT_EDGE: f64 = 6.00;

/// Weight used to search the price table.
///
/// Branches are evaluated in order and the first match wins. Stones in
/// [6, 10) ct fall to the 5 ct tier whether or not `use_bulk_weight_tier` is
/// set; between 5 and 6 ct only the flag moves the search weight.
pub fn search_weight(weight: f64, use_bulk_weight_tier: bool) -> f64 {
    if use_bulk_weight_tier && weight >= FIVE_CARAT_TIER {
        FIVE_CARAT_TIER
    } else if weight >= TEN_CARAT_TIER {
        TEN_CARAT_TIER
    } else if (SIX_CARAT_EDGE..TEN_CARAT_TIER).contains(&weight) {
        FIVE_CARAT_TIER
    } else {
        weight
    }
}
