//! External market data: the USD→INR exchange rate.

pub mod fx;
pub mod rate_cache;

pub use fx::{FxClient, PinnedRate, RateFetchError, RateOrigin, RateSource};
pub use rate_cache::{ExchangeRate, RateCache};
