//! Discount ⇄ absolute price reconciliation.
//!
//! Forward: `ppu = base * (1 - discount/100)`, `total = ppu * weight`,
//! `target = total * rate`. Reverse: `discount = (1 - ppu/base) * 100`, with
//! `ppu = total / weight` when a total was entered.
//!
//! The discount carries the internal sign (positive reduces the price); see
//! `DiscountToggle` for the user-facing convention.

use crate::domain::{PriceEdit, PriceInputs, Quote, QuoteBasis};

/// Forward derivation from a signed discount.
pub fn reconcile(base_price: f64, weight: f64, discount_percent: f64, exchange_rate: f64) -> Quote {
    let price_per_unit = base_price * (1.0 - discount_percent / 100.0);
    let total = price_per_unit * weight;
    Quote {
        weight,
        base_price_per_unit: base_price,
        discount_percent,
        price_per_unit_final: price_per_unit,
        total_price_source_currency: total,
        exchange_rate,
        total_price_target_currency: total * exchange_rate,
        basis: QuoteBasis::Discount,
    }
}

/// Back-solve the discount from an edited price per carat.
pub fn reconcile_from_price_per_unit(
    base_price: f64,
    weight: f64,
    price_per_unit: f64,
    exchange_rate: f64,
) -> Quote {
    let total = price_per_unit * weight;
    Quote {
        weight,
        base_price_per_unit: base_price,
        discount_percent: discount_from_price(base_price, price_per_unit),
        price_per_unit_final: price_per_unit,
        total_price_source_currency: total,
        exchange_rate,
        total_price_target_currency: total * exchange_rate,
        basis: QuoteBasis::PricePerUnit,
    }
}

/// Back-solve the discount from an edited total. A zero weight yields a zero
/// price per carat.
pub fn reconcile_from_total(base_price: f64, weight: f64, total_price: f64, exchange_rate: f64) -> Quote {
    let price_per_unit = if weight != 0.0 { total_price / weight } else { 0.0 };
    Quote {
        weight,
        base_price_per_unit: base_price,
        discount_percent: discount_from_price(base_price, price_per_unit),
        price_per_unit_final: price_per_unit,
        total_price_source_currency: total_price,
        exchange_rate,
        total_price_target_currency: total_price * exchange_rate,
        basis: QuoteBasis::Total,
    }
}

fn discount_from_price(base_price: f64, price_per_unit: f64) -> f64 {
    if base_price == 0.0 {
        return 0.0;
    }
    (1.0 - price_per_unit / base_price) * 100.0
}

/// Round to cents, the precision the price fields are shown and edited at.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decide which user-entered price, if any, overrides the discount.
///
/// An entered value counts as an edit only when it differs from the computed
/// default rounded to cents. Price per carat is checked first and wins when
/// both differ.
pub fn detect_edit(defaults: &Quote, inputs: &PriceInputs) -> PriceEdit {
    if let Some(ppu) = inputs.price_per_unit {
        if ppu != round_cents(defaults.price_per_unit_final) {
            return PriceEdit::PricePerUnit(ppu);
        }
    }
    if let Some(total) = inputs.total {
        if total != round_cents(defaults.total_price_source_currency) {
            return PriceEdit::Total(total);
        }
    }
    PriceEdit::None
}

/// One full recomputation: forward from the discount, then at most one edit.
pub fn reconcile_with_inputs(
    base_price: f64,
    weight: f64,
    discount_percent: f64,
    exchange_rate: f64,
    inputs: &PriceInputs,
) -> Quote {
    let defaults = reconcile(base_price, weight, discount_percent, exchange_rate);
    match detect_edit(&defaults, inputs) {
        PriceEdit::None => defaults,
        PriceEdit::PricePerUnit(ppu) => reconcile_from_price_per_unit(base_price, weight, ppu, exchange_rate),
        PriceEdit::Total(total) => reconcile_from_total(base_price, weight, total, exchange_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn ten_percent_discount_example() {
        let q = reconcile(1000.0, 1.0, 10.0, 85.50);
        assert!(close(q.price_per_unit_final, 900.0));
        assert!(close(q.total_price_source_currency, 900.0));
        assert!(close(q.total_price_target_currency, 76_950.0));
        assert!(close(q.display_discount(), -10.0));
        assert_eq!(q.basis, QuoteBasis::Discount);
    }

    #[test]
    fn negative_discount_is_a_premium() {
        let q = reconcile(2000.0, 0.5, -15.0, 1.0);
        assert!(close(q.price_per_unit_final, 2300.0));
        assert!(close(q.total_price_source_currency, 1150.0));
        assert!(close(q.display_discount(), 15.0));
    }

    #[test]
    fn price_per_unit_round_trip_recovers_discount() {
        for (base, weight, d) in [(1000.0, 1.0, 10.0), (6400.0, 0.93, -7.5), (35000.0, 12.3, 42.25)] {
            let fwd = reconcile(base, weight, d, 83.1);
            let back = reconcile_from_price_per_unit(base, weight, fwd.price_per_unit_final, 83.1);
            assert!(close(back.discount_percent, d), "base={base} d={d} got={}", back.discount_percent);
            assert!(close(back.total_price_source_currency, fwd.total_price_source_currency));
        }
    }

    #[test]
    fn total_edit_back_solves_price_and_discount() {
        let q = reconcile_from_total(1000.0, 2.0, 1500.0, 80.0);
        assert!(close(q.price_per_unit_final, 750.0));
        assert!(close(q.discount_percent, 25.0));
        assert!(close(q.total_price_target_currency, 120_000.0));
        assert_eq!(q.basis, QuoteBasis::Total);
    }

    #[test]
    fn total_edit_with_zero_weight_uses_zero_price() {
        let q = reconcile_from_total(1000.0, 0.0, 1500.0, 80.0);
        assert_eq!(q.price_per_unit_final, 0.0);
        assert!(close(q.discount_percent, 100.0));
    }

    #[test]
    fn unchanged_inputs_are_not_edits() {
        let defaults = reconcile(1234.0, 0.7, 3.0, 85.5);
        let inputs = PriceInputs {
            price_per_unit: Some(round_cents(defaults.price_per_unit_final)),
            total: Some(round_cents(defaults.total_price_source_currency)),
        };
        assert_eq!(detect_edit(&defaults, &inputs), PriceEdit::None);
        assert_eq!(detect_edit(&defaults, &PriceInputs::default()), PriceEdit::None);
    }

    #[test]
    fn price_per_unit_edit_wins_over_total_edit() {
        let defaults = reconcile(1000.0, 1.0, 10.0, 85.5);
        let inputs = PriceInputs {
            price_per_unit: Some(950.0),
            total: Some(1.0),
        };
        assert_eq!(detect_edit(&defaults, &inputs), PriceEdit::PricePerUnit(950.0));

        let q = reconcile_with_inputs(1000.0, 1.0, 10.0, 85.5, &inputs);
        assert_eq!(q.basis, QuoteBasis::PricePerUnit);
        assert!(close(q.discount_percent, 5.0));
        assert!(close(q.total_price_source_currency, 950.0));
    }

    #[test]
    fn total_edit_applies_when_price_per_unit_is_unchanged() {
        let inputs = PriceInputs {
            price_per_unit: Some(900.0),
            total: Some(800.0),
        };
        let q = reconcile_with_inputs(1000.0, 1.0, 10.0, 2.0, &inputs);
        assert_eq!(q.basis, QuoteBasis::Total);
        assert!(close(q.price_per_unit_final, 800.0));
        assert!(close(q.discount_percent, 20.0));
        assert!(close(q.total_price_target_currency, 1600.0));
    }

    #[test]
    fn zero_base_price_does_not_divide() {
        let q = reconcile_from_price_per_unit(0.0, 1.0, 500.0, 1.0);
        assert_eq!(q.discount_percent, 0.0);
    }
}
