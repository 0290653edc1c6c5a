//! In-memory reference price table.
//!
//! The table holds two partitions (round / fancy) in source order. It is built
//! once by `io::ingest::load_price_table` and never mutated afterwards.

use chrono::NaiveDate;

use crate::domain::{Clarity, Color, PriceBandRecord, ShapeCode};

/// Two bands under the same (shape, clarity, color) key whose weight ranges intersect.
#[derive(Debug, Clone, PartialEq)]
pub struct BandOverlap {
    pub shape_code: ShapeCode,
    pub clarity: Clarity,
    pub color: Color,
    /// Table-order index of the band that wins lookups.
    pub first: usize,
    pub second: usize,
    pub first_range: (f64, f64),
    pub second_range: (f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    round: Vec<PriceBandRecord>,
    fancy: Vec<PriceBandRecord>,
}

impl PriceTable {
    pub fn from_partitions(round: Vec<PriceBandRecord>, fancy: Vec<PriceBandRecord>) -> Self {
        Self { round, fancy }
    }

    pub fn partition(&self, code: ShapeCode) -> &[PriceBandRecord] {
        match code {
            ShapeCode::Round => &self.round,
            ShapeCode::Fancy => &self.fancy,
        }
    }

    pub fn len(&self) -> usize {
        self.round.len() + self.fancy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First band, in table order, matching the key and containing `weight`.
    ///
    /// FL is searched as IF.
    pub fn lookup(
        &self,
        shape_code: ShapeCode,
        clarity: Clarity,
        color: Color,
        weight: f64,
    ) -> Option<&PriceBandRecord> {
        let clarity = clarity.lookup_grade();
        self.partition(shape_code).iter().find(|r| {
            r.shape_code == shape_code && r.clarity == clarity && r.color == color && r.contains(weight)
        })
    }

    /// Most recent as-of date across both partitions.
    pub fn latest_as_of(&self) -> Option<NaiveDate> {
        self.round
            .iter()
            .chain(self.fancy.iter())
            .filter_map(|r| r.as_of_date)
            .max()
    }

    /// Every pair of intersecting bands within a partition key.
    ///
    /// Lookups keep returning the first band in table order; the pairs are
    /// reported so the data can be fixed upstream.
    pub fn overlapping_bands(&self) -> Vec<BandOverlap> {
        let mut out = Vec::new();
        for code in ShapeCode::ALL {
            let records = self.partition(code);
            for (i, a) in records.iter().enumerate() {
                for (j, b) in records.iter().enumerate().skip(i + 1) {
                    let same_key =
                        a.shape_code == b.shape_code && a.clarity == b.clarity && a.color == b.color;
                    if same_key && a.weight_from <= b.weight_to && b.weight_from <= a.weight_to {
                        out.push(BandOverlap {
                            shape_code: a.shape_code,
                            clarity: a.clarity,
                            color: a.color,
                            first: i,
                            second: j,
                            first_range: (a.weight_from, a.weight_to),
                            second_range: (b.weight_from, b.weight_to),
                        });
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn band(
        shape_code: ShapeCode,
        clarity: Clarity,
        color: Color,
        range: (f64, f64),
        price: f64,
    ) -> PriceBandRecord {
        PriceBandRecord {
            shape_code,
            clarity,
            color,
            weight_from: range.0,
            weight_to: range.1,
            price_per_unit: price,
            as_of_date: None,
        }
    }

    #[test]
    fn lookup_matches_inclusive_bounds() {
        let table = PriceTable::from_partitions(
            vec![
                band(ShapeCode::Round, Clarity::Vs1, Color::G, (0.90, 0.99), 6400.0),
                band(ShapeCode::Round, Clarity::Vs1, Color::G, (1.00, 1.49), 9800.0),
            ],
            vec![],
        );

        let at_lower = table.lookup(ShapeCode::Round, Clarity::Vs1, Color::G, 1.00).unwrap();
        let at_upper = table.lookup(ShapeCode::Round, Clarity::Vs1, Color::G, 1.49).unwrap();
        assert_eq!(at_lower.price_per_unit, 9800.0);
        assert_eq!(at_upper.price_per_unit, 9800.0);
        assert!(table.lookup(ShapeCode::Round, Clarity::Vs1, Color::G, 1.50).is_none());
        assert!(table.lookup(ShapeCode::Round, Clarity::Vs1, Color::H, 1.00).is_none());
        assert!(table.lookup(ShapeCode::Fancy, Clarity::Vs1, Color::G, 1.00).is_none());
    }

    #[test]
    fn fl_and_if_resolve_to_the_same_band() {
        let table = PriceTable::from_partitions(
            vec![band(ShapeCode::Round, Clarity::If, Color::D, (0.50, 0.69), 12000.0)],
            vec![band(ShapeCode::Fancy, Clarity::If, Color::E, (0.50, 0.69), 8000.0)],
        );

        for (code, color) in [(ShapeCode::Round, Color::D), (ShapeCode::Fancy, Color::E)] {
            let fl = table.lookup(code, Clarity::Fl, color, 0.55);
            let if_ = table.lookup(code, Clarity::If, color, 0.55);
            assert!(fl.is_some());
            assert_eq!(fl, if_);
        }
    }

    #[test]
    fn first_band_in_table_order_wins_and_overlap_is_reported() {
        let table = PriceTable::from_partitions(
            vec![],
            vec![
                band(ShapeCode::Fancy, Clarity::Si1, Color::H, (1.00, 1.49), 4100.0),
                band(ShapeCode::Fancy, Clarity::Si1, Color::H, (1.40, 1.99), 4600.0),
                band(ShapeCode::Fancy, Clarity::Si1, Color::I, (1.40, 1.99), 3900.0),
            ],
        );

        let hit = table.lookup(ShapeCode::Fancy, Clarity::Si1, Color::H, 1.45).unwrap();
        assert_eq!(hit.price_per_unit, 4100.0);

        let overlaps = table.overlapping_bands();
        assert_eq!(overlaps.len(), 1);
        assert_eq!((overlaps[0].first, overlaps[0].second), (0, 1));
        assert_eq!(overlaps[0].color, Color::H);
    }

    #[test]
    fn latest_as_of_skips_missing_dates() {
        let mut a = band(ShapeCode::Round, Clarity::If, Color::D, (0.3, 0.39), 1.0);
        a.as_of_date = NaiveDate::from_ymd_opt(2025, 4, 4);
        let b = band(ShapeCode::Round, Clarity::If, Color::E, (0.3, 0.39), 1.0);
        let mut c = band(ShapeCode::Fancy, Clarity::If, Color::D, (0.3, 0.39), 1.0);
        c.as_of_date = NaiveDate::from_ymd_opt(2025, 4, 8);

        let table = PriceTable::from_partitions(vec![a, b], vec![c]);
        assert_eq!(table.latest_as_of(), NaiveDate::from_ymd_opt(2025, 4, 8));
        assert_eq!(PriceTable::default().latest_as_of(), None);
    }
}
