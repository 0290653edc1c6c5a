//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pricing code stays free of presentation concerns
//! - output changes are localized

use chrono::NaiveDate;

use crate::app::pipeline::{QuoteOutcome, RecutOutput, StoneQuote};
use crate::domain::{ComparisonResult, ShapeCode, StoneSpec};
use crate::pricing::{NoPriceMatch, PriceTable};

/// `$1234.50` (no grouping, two decimals).
pub fn fmt_usd(v: f64) -> String {
    if v < 0.0 {
        format!("-${:.2}", v.abs())
    } else {
        format!("${v:.2}")
    }
}

/// `₹76,950.00` (thousands grouping, two decimals).
pub fn fmt_inr(v: f64) -> String {
    format!("₹{}", fmt_grouped(v))
}

/// Two decimals with comma thousands separators.
pub fn fmt_grouped(v: f64) -> String {
    let raw = format!("{:.2}", v.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && !raw.trim_start_matches(['0', '.']).is_empty() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn fmt_percent(v: f64) -> String {
    format!("{v:.2}%")
}

/// `08 April 2025`
pub fn fmt_date(d: NaiveDate) -> String {
    d.format("%d %B %Y").to_string()
}

pub fn format_last_updated(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| format!("Last updated price data: {}", fmt_date(d)))
}

pub fn format_stone_line(stone: &StoneSpec) -> String {
    format!(
        "{} {:.2}ct {} {}{}",
        stone.shape.display_name(),
        stone.weight,
        stone.color.code(),
        stone.clarity.code(),
        if stone.use_bulk_weight_tier { " (5ct tier)" } else { "" },
    )
}

/// Summary block for a priced stone.
pub fn format_quote_summary(label: &str, priced: &StoneQuote) -> String {
    let q = &priced.quote;
    let r = &priced.resolved;
    let mut out = String::new();

    out.push_str(&format!("=== {label} ===\n"));
    out.push_str(&format!("Reference price/ct: {}", fmt_usd(r.base_price_per_unit)));
    if (r.search_weight - q.weight).abs() > f64::EPSILON {
        out.push_str(&format!(" (priced at {:.2}ct tier)", r.search_weight));
    }
    out.push('\n');
    out.push_str(&format!("Discount: {}\n", fmt_percent(q.display_discount())));
    out.push_str(&format!("Price per Ct (USD): {}\n", fmt_usd(q.price_per_unit_final)));
    out.push_str(&format!("Total Price (USD): {}\n", fmt_usd(q.total_price_source_currency)));
    out.push_str(&format!("USD to INR Rate: ₹{:.2}\n", q.exchange_rate));
    out.push_str(&format!("Total Price (INR): {}\n", fmt_inr(q.total_price_target_currency)));

    if let Some(warning) = &priced.rate.warning {
        out.push_str(&format!("Warning: {warning}\n"));
    }

    out
}

pub fn format_no_match(label: &str, no_match: &NoPriceMatch) -> String {
    format!("=== {label} ===\n{no_match}\n")
}

pub fn format_outcome(label: &str, outcome: &QuoteOutcome) -> String {
    match outcome {
        QuoteOutcome::Priced(priced) => format_quote_summary(label, priced),
        QuoteOutcome::NoMatch(no_match) => format_no_match(label, no_match),
    }
}

pub fn format_comparison(cmp: &ComparisonResult) -> String {
    let mut out = String::new();
    out.push_str("=== Final Cost Summary ===\n");
    out.push_str(&format!("Difference in Total Price (USD): {}\n", fmt_usd(cmp.difference)));
    out.push_str(&format!("Cost %: {}\n", fmt_percent(cmp.cost_percent)));
    out.push_str(&format!("Up/Down %: {}\n", fmt_percent(cmp.change_percent)));
    out
}

/// Both stones, the last-updated line and (when both priced) the comparison.
pub fn format_recut(out: &RecutOutput, last_updated: Option<NaiveDate>) -> String {
    let mut text = String::new();
    text.push_str(&format_outcome("Diamond A", &out.a));
    text.push('\n');
    text.push_str(&format_outcome("Diamond B", &out.b));

    if let Some(line) = format_last_updated(last_updated) {
        text.push('\n');
        text.push_str(&line);
        text.push('\n');
    }

    match &out.comparison {
        Some(cmp) => {
            text.push('\n');
            text.push_str(&format_comparison(cmp));
        }
        None => text.push_str("\nComparison unavailable: both stones need a price.\n"),
    }

    text
}

/// Price-source diagnostics for `dpx table`.
pub fn format_table_summary(table: &PriceTable) -> String {
    let mut out = String::new();
    out.push_str("=== Price table ===\n");
    for code in ShapeCode::ALL {
        out.push_str(&format!(
            "{:<6} ({}): {} bands\n",
            code.partition_name(),
            code.code(),
            table.partition(code).len()
        ));
    }
    match table.latest_as_of() {
        Some(d) => out.push_str(&format!("Latest as-of: {}\n", fmt_date(d))),
        None => out.push_str("Latest as-of: -\n"),
    }

    let overlaps = table.overlapping_bands();
    out.push_str(&format!("Overlapping bands: {}\n", overlaps.len()));
    for o in &overlaps {
        out.push_str(&format!(
            "  {} {} {}: rows {} [{:.2}-{:.2}] and {} [{:.2}-{:.2}]\n",
            o.shape_code.code(),
            o.clarity.code(),
            o.color.code(),
            o.first + 1,
            o.first_range.0,
            o.first_range.1,
            o.second + 1,
            o.second_range.0,
            o.second_range.1,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ExchangeRate, RateOrigin};
    use crate::pricing::{ResolvedPrice, reconcile};
    use chrono::Utc;

    #[test]
    fn grouped_amounts() {
        assert_eq!(fmt_grouped(76_950.0), "76,950.00");
        assert_eq!(fmt_grouped(1_234_567.891), "1,234,567.89");
        assert_eq!(fmt_grouped(999.999), "1,000.00");
        assert_eq!(fmt_grouped(12.5), "12.50");
        assert_eq!(fmt_grouped(-4321.0), "-4,321.00");
        assert_eq!(fmt_grouped(-0.001), "0.00");
    }

    #[test]
    fn currency_symbols() {
        assert_eq!(fmt_usd(900.0), "$900.00");
        assert_eq!(fmt_usd(-300.0), "-$300.00");
        assert_eq!(fmt_inr(76_950.0), "₹76,950.00");
    }

    #[test]
    fn last_updated_uses_long_month() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 8);
        assert_eq!(
            format_last_updated(d).as_deref(),
            Some("Last updated price data: 08 April 2025")
        );
        assert_eq!(format_last_updated(None), None);
    }

    #[test]
    fn summary_shows_display_discount_and_inr_total() {
        let priced = StoneQuote {
            resolved: ResolvedPrice {
                base_price_per_unit: 1000.0,
                search_weight: 1.0,
                band_from: 1.0,
                band_to: 1.49,
                as_of_date: None,
            },
            quote: reconcile(1000.0, 1.0, 10.0, 85.5),
            rate: ExchangeRate {
                rate: 85.5,
                origin: RateOrigin::Fallback,
                fetched_at: Utc::now(),
                warning: Some("Using fallback rate ₹85.50.".to_string()),
            },
        };

        let text = format_quote_summary("Diamond", &priced);
        assert!(text.contains("Discount: -10.00%"), "{text}");
        assert!(text.contains("Price per Ct (USD): $900.00"), "{text}");
        assert!(text.contains("Total Price (INR): ₹76,950.00"), "{text}");
        assert!(text.contains("Warning: Using fallback rate"), "{text}");
        assert!(!text.contains("tier"), "{text}");
    }

    #[test]
    fn comparison_block() {
        let text = format_comparison(&ComparisonResult {
            difference: 300.0,
            cost_percent: -10.0,
            change_percent: 100.0 / 3.0,
        });
        assert!(text.contains("Difference in Total Price (USD): $300.00"));
        assert!(text.contains("Cost %: -10.00%"));
        assert!(text.contains("Up/Down %: 33.33%"));
    }
}
