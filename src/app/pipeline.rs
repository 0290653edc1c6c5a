//! Shared quote pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! stone → bucketing + lookup → exchange rate → reconciliation (→ comparison)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{ExchangeRate, RateCache, RateSource};
use crate::domain::{ComparisonResult, DiscountToggle, PriceInputs, Quote, StoneSpec};
use crate::pricing::{NoPriceMatch, PriceTable, ResolvedPrice, compare_quotes, reconcile_with_inputs, resolve_base_price};

/// Everything the user supplied for one stone. Toggle state is per stone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoneRequest {
    pub stone: StoneSpec,
    pub toggle: DiscountToggle,
    pub inputs: PriceInputs,
}

/// A priced stone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoneQuote {
    pub resolved: ResolvedPrice,
    pub quote: Quote,
    pub rate: ExchangeRate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteOutcome {
    Priced(StoneQuote),
    NoMatch(NoPriceMatch),
}

impl QuoteOutcome {
    pub fn priced(&self) -> Option<&StoneQuote> {
        match self {
            QuoteOutcome::Priced(q) => Some(q),
            QuoteOutcome::NoMatch(_) => None,
        }
    }
}

/// Outputs of a two-stone run. The comparison exists only when both stones priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecutOutput {
    pub a: QuoteOutcome,
    pub b: QuoteOutcome,
    pub comparison: Option<ComparisonResult>,
}

/// Borrowed view over the table and the exchange-rate state for one computation.
pub struct Pricer<'a> {
    table: &'a PriceTable,
    rates: &'a mut RateCache,
    source: &'a dyn RateSource,
}

impl<'a> Pricer<'a> {
    pub fn new(table: &'a PriceTable, rates: &'a mut RateCache, source: &'a dyn RateSource) -> Self {
        Self { table, rates, source }
    }

    /// Price one stone. The rate is only consulted once a band matched.
    pub fn quote(&mut self, request: &StoneRequest, now: DateTime<Utc>) -> QuoteOutcome {
        let resolved = match resolve_base_price(self.table, &request.stone) {
            Ok(resolved) => resolved,
            Err(no_match) => return QuoteOutcome::NoMatch(no_match),
        };

        let rate = self.rates.current(self.source, now);
        let quote = reconcile_with_inputs(
            resolved.base_price_per_unit,
            request.stone.weight,
            request.toggle.internal_discount(),
            rate.rate,
            &request.inputs,
        );

        QuoteOutcome::Priced(StoneQuote { resolved, quote, rate })
    }

    /// Price two stones independently and compare them.
    pub fn recut(&mut self, a: &StoneRequest, b: &StoneRequest, now: DateTime<Utc>) -> RecutOutput {
        let a = self.quote(a, now);
        let b = self.quote(b, now);

        let comparison = match (a.priced(), b.priced()) {
            (Some(qa), Some(qb)) => Some(compare_quotes(&qa.quote, &qb.quote)),
            _ => None,
        };

        RecutOutput { a, b, comparison }
    }
}
