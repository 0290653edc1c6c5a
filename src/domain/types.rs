//! Shared domain types.
//!
//! Grades and shapes are closed vocabularies; the price source stores them as
//! short codes (`BR`, `VVS1`, `D`, ...) which are parsed with `from_code`.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Price-table partition key.
///
/// Round stones are priced from the `BR` partition; every other shape shares
/// the fancy (`PS`) partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeCode {
    #[serde(rename = "BR")]
    Round,
    #[serde(rename = "PS")]
    Fancy,
}

impl ShapeCode {
    pub const ALL: [ShapeCode; 2] = [ShapeCode::Round, ShapeCode::Fancy];

    pub fn code(self) -> &'static str {
        match self {
            ShapeCode::Round => "BR",
            ShapeCode::Fancy => "PS",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BR" => Some(ShapeCode::Round),
            "PS" => Some(ShapeCode::Fancy),
            _ => None,
        }
    }

    pub fn partition_name(self) -> &'static str {
        match self {
            ShapeCode::Round => "round",
            ShapeCode::Fancy => "fancy",
        }
    }
}

/// Display vocabulary of cut shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Round,
    Princess,
    Emerald,
    Asscher,
    Marquise,
    Oval,
    Radiant,
    Pear,
    Heart,
    Cushion,
    CushionBrilliant,
    Kite,
}

impl Shape {
    pub const ALL: [Shape; 12] = [
        Shape::Round,
        Shape::Princess,
        Shape::Emerald,
        Shape::Asscher,
        Shape::Marquise,
        Shape::Oval,
        Shape::Radiant,
        Shape::Pear,
        Shape::Heart,
        Shape::Cushion,
        Shape::CushionBrilliant,
        Shape::Kite,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Shape::Round => "Round",
            Shape::Princess => "Princess",
            Shape::Emerald => "Emerald",
            Shape::Asscher => "Asscher",
            Shape::Marquise => "Marquise",
            Shape::Oval => "Oval",
            Shape::Radiant => "Radiant",
            Shape::Pear => "Pear",
            Shape::Heart => "Heart",
            Shape::Cushion => "Cushion",
            Shape::CushionBrilliant => "Cushion Brilliant",
            Shape::Kite => "Kite",
        }
    }

    pub fn shape_code(self) -> ShapeCode {
        match self {
            Shape::Round => ShapeCode::Round,
            _ => ShapeCode::Fancy,
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Color grade, D (colorless) through M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum Color {
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
}

impl Color {
    pub const ALL: [Color; 10] = [
        Color::D,
        Color::E,
        Color::F,
        Color::G,
        Color::H,
        Color::I,
        Color::J,
        Color::K,
        Color::L,
        Color::M,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Color::D => "D",
            Color::E => "E",
            Color::F => "F",
            Color::G => "G",
            Color::H => "H",
            Color::I => "I",
            Color::J => "J",
            Color::K => "K",
            Color::L => "L",
            Color::M => "M",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(raw))
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Clarity grade.
///
/// `Fl` is a valid query grade but is never stored in the price table: FL and
/// IF share pricing, see [`Clarity::lookup_grade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum Clarity {
    Fl,
    If,
    Vvs1,
    Vvs2,
    Vs1,
    Vs2,
    Si1,
    Si2,
    Si3,
    I1,
    I2,
    I3,
}

impl Clarity {
    pub const ALL: [Clarity; 12] = [
        Clarity::Fl,
        Clarity::If,
        Clarity::Vvs1,
        Clarity::Vvs2,
        Clarity::Vs1,
        Clarity::Vs2,
        Clarity::Si1,
        Clarity::Si2,
        Clarity::Si3,
        Clarity::I1,
        Clarity::I2,
        Clarity::I3,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Clarity::Fl => "FL",
            Clarity::If => "IF",
            Clarity::Vvs1 => "VVS1",
            Clarity::Vvs2 => "VVS2",
            Clarity::Vs1 => "VS1",
            Clarity::Vs2 => "VS2",
            Clarity::Si1 => "SI1",
            Clarity::Si2 => "SI2",
            Clarity::Si3 => "SI3",
            Clarity::I1 => "I1",
            Clarity::I2 => "I2",
            Clarity::I3 => "I3",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(raw))
    }

    /// The grade actually searched in the table.
    pub fn lookup_grade(self) -> Self {
        match self {
            Clarity::Fl => Clarity::If,
            other => other,
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: isize) -> T {
    let len = all.len() as isize;
    let idx = all.iter().position(|v| *v == current).unwrap_or(0) as isize;
    all[(idx + step).rem_euclid(len) as usize]
}

/// One row of the reference price table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBandRecord {
    pub shape_code: ShapeCode,
    pub clarity: Clarity,
    pub color: Color,
    /// Inclusive lower weight bound (carats).
    pub weight_from: f64,
    /// Inclusive upper weight bound (carats).
    pub weight_to: f64,
    /// Reference price per carat (USD).
    pub price_per_unit: f64,
    /// Absent when the source date did not parse.
    pub as_of_date: Option<NaiveDate>,
}

impl PriceBandRecord {
    pub fn contains(&self, weight: f64) -> bool {
        self.weight_from <= weight && weight <= self.weight_to
    }
}

/// Query input for a single stone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoneSpec {
    pub weight: f64,
    pub shape: Shape,
    pub color: Color,
    pub clarity: Clarity,
    pub use_bulk_weight_tier: bool,
}

impl StoneSpec {
    pub fn shape_code(&self) -> ShapeCode {
        self.shape.shape_code()
    }
}

/// Which way the discount control moves the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiscountDirection {
    /// Price above reference ("+" control). Stored as a negative internal discount.
    #[default]
    Premium,
    /// Price below reference ("-" control). Stored as a positive internal discount.
    Discount,
}

impl DiscountDirection {
    pub fn toggled(self) -> Self {
        match self {
            DiscountDirection::Premium => DiscountDirection::Discount,
            DiscountDirection::Discount => DiscountDirection::Premium,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DiscountDirection::Premium => "+",
            DiscountDirection::Discount => "-",
        }
    }
}

/// Per-stone discount control state.
///
/// The internal discount and the displayed discount have opposite signs: a
/// premium is stored negative (and displayed positive), a discount is stored
/// positive (and displayed negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscountToggle {
    pub direction: DiscountDirection,
    /// Unsigned percentage, 0..=100.
    pub magnitude: f64,
}

impl Default for DiscountToggle {
    fn default() -> Self {
        Self {
            direction: DiscountDirection::Premium,
            magnitude: 10.0,
        }
    }
}

impl DiscountToggle {
    pub fn new(direction: DiscountDirection, magnitude: f64) -> Self {
        Self { direction, magnitude }
    }

    /// Signed discount as used by the reconciler (positive reduces price).
    pub fn internal_discount(&self) -> f64 {
        match self.direction {
            DiscountDirection::Premium => -self.magnitude.abs(),
            DiscountDirection::Discount => self.magnitude.abs(),
        }
    }
}

/// User-entered absolute prices (USD) competing with the discount control.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PriceInputs {
    pub price_per_unit: Option<f64>,
    pub total: Option<f64>,
}

/// The single edit honored in a recomputation cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceEdit {
    None,
    PricePerUnit(f64),
    Total(f64),
}

/// Which input the final quote was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteBasis {
    Discount,
    PricePerUnit,
    Total,
}

/// Reconciled price for one stone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub weight: f64,
    pub base_price_per_unit: f64,
    /// Internal sign: positive reduces the price.
    pub discount_percent: f64,
    pub price_per_unit_final: f64,
    pub total_price_source_currency: f64,
    pub exchange_rate: f64,
    pub total_price_target_currency: f64,
    pub basis: QuoteBasis,
}

impl Quote {
    /// Discount as shown to the user (sign inverted).
    pub fn display_discount(&self) -> f64 {
        -self.discount_percent
    }
}

/// Deltas between two stones (A is the rough/current, B the recut target).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub difference: f64,
    pub cost_percent: f64,
    pub change_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_round_maps_to_round_partition() {
        for shape in Shape::ALL {
            let expected = if shape == Shape::Round {
                ShapeCode::Round
            } else {
                ShapeCode::Fancy
            };
            assert_eq!(shape.shape_code(), expected, "{shape:?}");
        }
    }

    #[test]
    fn fl_is_looked_up_as_if() {
        assert_eq!(Clarity::Fl.lookup_grade(), Clarity::If);
        assert_eq!(Clarity::Vs2.lookup_grade(), Clarity::Vs2);
    }

    #[test]
    fn codes_parse_case_insensitively() {
        assert_eq!(Clarity::from_code(" vvs1 "), Some(Clarity::Vvs1));
        assert_eq!(Color::from_code("h"), Some(Color::H));
        assert_eq!(ShapeCode::from_code("ps"), Some(ShapeCode::Fancy));
        assert_eq!(Clarity::from_code("SI4"), None);
        assert_eq!(Color::from_code("N"), None);
    }

    #[test]
    fn toggle_sign_is_inverted_from_display() {
        let premium = DiscountToggle::new(DiscountDirection::Premium, 12.5);
        let discount = DiscountToggle::new(DiscountDirection::Discount, -12.5);
        assert_eq!(premium.internal_discount(), -12.5);
        assert_eq!(discount.internal_discount(), 12.5);
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(Color::M.next(), Color::D);
        assert_eq!(Color::D.prev(), Color::M);
        assert_eq!(Shape::Kite.next(), Shape::Round);
        assert_eq!(Clarity::Fl.prev(), Clarity::I3);
    }
}
