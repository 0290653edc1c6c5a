//! Stone attributes → base price per carat.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Clarity, Color, Shape, ShapeCode, StoneSpec};
use crate::pricing::bucket::search_weight;
use crate::pricing::table::PriceTable;

/// A successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub base_price_per_unit: f64,
    /// Weight actually searched after bucketing.
    pub search_weight: f64,
    pub band_from: f64,
    pub band_to: f64,
    pub as_of_date: Option<NaiveDate>,
}

/// No band satisfies the (shape, clarity, color, bucketed weight) filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoPriceMatch {
    pub shape: Shape,
    pub shape_code: ShapeCode,
    pub clarity: Clarity,
    pub color: Color,
    pub weight: f64,
    pub search_weight: f64,
}

impl std::fmt::Display for NoPriceMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No matching price found for {} {:.2}ct {} {} (searched {} at {:.2}ct).",
            self.shape.display_name(),
            self.weight,
            self.color.code(),
            self.clarity.code(),
            self.shape_code.code(),
            self.search_weight,
        )
    }
}

impl std::error::Error for NoPriceMatch {}

/// Apply the bucketing policy and look the stone up.
pub fn resolve_base_price(table: &PriceTable, stone: &StoneSpec) -> Result<ResolvedPrice, NoPriceMatch> {
    let shape_code = stone.shape_code();
    let weight = search_weight(stone.weight, stone.use_bulk_weight_tier);

    match table.lookup(shape_code, stone.clarity, stone.color, weight) {
        Some(band) => Ok(ResolvedPrice {
            base_price_per_unit: band.price_per_unit,
            search_weight: weight,
            band_from: band.weight_from,
            band_to: band.weight_to,
            as_of_date: band.as_of_date,
        }),
        None => {
            tracing::debug!(
                shape = shape_code.code(),
                clarity = stone.clarity.code(),
                color = stone.color.code(),
                weight = stone.weight,
                search_weight = weight,
                "no price band matched"
            );
            Err(NoPriceMatch {
                shape: stone.shape,
                shape_code,
                clarity: stone.clarity,
                color: stone.color,
                weight: stone.weight,
                search_weight: weight,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::table::tests::band;

    fn table() -> PriceTable {
        PriceTable::from_partitions(
            vec![
                band(ShapeCode::Round, Clarity::If, Color::D, (1.00, 1.49), 30000.0),
                band(ShapeCode::Round, Clarity::Vs2, Color::H, (5.00, 5.99), 21000.0),
                band(ShapeCode::Round, Clarity::Vs2, Color::H, (10.00, 10.99), 35000.0),
            ],
            vec![band(ShapeCode::Fancy, Clarity::Vs2, Color::H, (5.00, 5.99), 15000.0)],
        )
    }

    fn stone(shape: Shape, weight: f64, color: Color, clarity: Clarity, bulk: bool) -> StoneSpec {
        StoneSpec {
            weight,
            shape,
            color,
            clarity,
            use_bulk_weight_tier: bulk,
        }
    }

    #[test]
    fn seven_carat_round_prices_at_five_carat_tier() {
        let resolved = resolve_base_price(&table(), &stone(Shape::Round, 7.0, Color::H, Clarity::Vs2, false)).unwrap();
        assert_eq!(resolved.search_weight, 5.0);
        assert_eq!(resolved.base_price_per_unit, 21000.0);
    }

    #[test]
    fn twelve_carat_round_prices_at_ten_carat_tier_unless_bulk() {
        let t = table();
        let plain = resolve_base_price(&t, &stone(Shape::Round, 12.0, Color::H, Clarity::Vs2, false)).unwrap();
        let bulk = resolve_base_price(&t, &stone(Shape::Round, 12.0, Color::H, Clarity::Vs2, true)).unwrap();
        assert_eq!(plain.base_price_per_unit, 35000.0);
        assert_eq!(bulk.base_price_per_unit, 21000.0);
    }

    #[test]
    fn fancy_shapes_use_fancy_partition() {
        let resolved = resolve_base_price(&table(), &stone(Shape::Oval, 6.5, Color::H, Clarity::Vs2, false)).unwrap();
        assert_eq!(resolved.base_price_per_unit, 15000.0);
    }

    #[test]
    fn flawless_prices_like_internally_flawless() {
        let t = table();
        let fl = resolve_base_price(&t, &stone(Shape::Round, 1.2, Color::D, Clarity::Fl, false));
        let if_ = resolve_base_price(&t, &stone(Shape::Round, 1.2, Color::D, Clarity::If, false));
        assert_eq!(fl.unwrap(), if_.unwrap());
    }

    #[test]
    fn missing_combination_is_an_explicit_no_match() {
        let err = resolve_base_price(&table(), &stone(Shape::Pear, 1.2, Color::D, Clarity::If, false)).unwrap_err();
        assert_eq!(err.shape_code, ShapeCode::Fancy);
        assert_eq!(err.search_weight, 1.2);
        assert!(err.to_string().starts_with("No matching price found for Pear 1.20ct D IF"));
    }
}
