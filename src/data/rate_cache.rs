//! Exchange-rate cache with a fixed time-to-live.
//!
//! Expiry is a pure check against a caller-supplied `now`; refreshing is an
//! explicit step that performs one fetch attempt (no retries). A failed fetch
//! caches the fallback rate for the same TTL.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::data::fx::{RateOrigin, RateSource};

pub const DEFAULT_TTL_SECS: i64 = 3600;
pub const FALLBACK_USD_INR: f64 = 85.50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    pub rate: f64,
    pub origin: RateOrigin,
    pub fetched_at: DateTime<Utc>,
    /// User-facing notice when the fallback rate is in use.
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RateCache {
    ttl: Duration,
    fallback: f64,
    entry: Option<ExchangeRate>,
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS), FALLBACK_USD_INR)
    }
}

impl RateCache {
    pub fn new(ttl: Duration, fallback: f64) -> Self {
        Self {
            ttl,
            fallback,
            entry: None,
        }
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn cached(&self) -> Option<&ExchangeRate> {
        self.entry.as_ref()
    }

    /// True when there is no entry or the entry is at least `ttl` old.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.entry {
            None => true,
            Some(entry) => now - entry.fetched_at >= self.ttl,
        }
    }

    /// Fetch once and store the result, falling back on failure.
    pub fn refresh(&mut self, source: &dyn RateSource, now: DateTime<Utc>) -> ExchangeRate {
        let entry = match source.fetch_rate() {
            Ok(rate) => {
                tracing::debug!(rate, "exchange rate refreshed");
                ExchangeRate {
                    rate,
                    origin: source.origin(),
                    fetched_at: now,
                    warning: None,
                }
            }
            Err(err) => {
                tracing::warn!(fallback = self.fallback, error = %err, "exchange rate fetch failed");
                ExchangeRate {
                    rate: self.fallback,
                    origin: RateOrigin::Fallback,
                    fetched_at: now,
                    warning: Some(format!(
                        "Could not fetch live INR rate ({err}). Using fallback rate ₹{:.2}.",
                        self.fallback
                    )),
                }
            }
        };
        self.entry = Some(entry.clone());
        entry
    }

    /// Cached rate, refreshed first if missing or expired.
    pub fn current(&mut self, source: &dyn RateSource, now: DateTime<Utc>) -> ExchangeRate {
        if !self.is_expired(now) {
            if let Some(entry) = &self.entry {
                return entry.clone();
            }
        }
        self.refresh(source, now)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
