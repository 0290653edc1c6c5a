//! Live USD→INR quote from the exchangerate.host `live` endpoint.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_FX_URL: &str = "http://api.exchangerate.host/live";
pub const ACCESS_KEY_ENV: &str = "DPX_FX_ACCESS_KEY";
pub const URL_ENV: &str = "DPX_FX_URL";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const SOURCE_CURRENCY: &str = "USD";
const TARGET_CURRENCY: &str = "INR";
const QUOTE_KEY: &str = "USDINR";

/// Where a rate value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Live,
    /// Fixed on the command line.
    Pinned,
    Fallback,
}

/// Anything that can produce a USD→INR rate.
pub trait RateSource {
    fn fetch_rate(&self) -> Result<f64, RateFetchError>;

    fn origin(&self) -> RateOrigin {
        RateOrigin::Live
    }
}

/// Why a live rate could not be used.
#[derive(Debug, Clone, PartialEq)]
pub enum RateFetchError {
    MissingAccessKey,
    /// Network error or timeout.
    Request(String),
    Status(u16),
    Parse(String),
    /// The service answered but did not report success.
    Unsuccessful(String),
    MissingQuote(String),
    InvalidRate(f64),
}

impl std::fmt::Display for RateFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateFetchError::MissingAccessKey => {
                write!(f, "no access key configured (set {ACCESS_KEY_ENV})")
            }
            RateFetchError::Request(e) => write!(f, "request failed: {e}"),
            RateFetchError::Status(code) => write!(f, "request failed with status {code}"),
            RateFetchError::Parse(e) => write!(f, "failed to parse response: {e}"),
            RateFetchError::Unsuccessful(body) => write!(f, "unexpected response format: {body}"),
            RateFetchError::MissingQuote(body) => write!(f, "response has no {QUOTE_KEY} quote: {body}"),
            RateFetchError::InvalidRate(v) => write!(f, "invalid {QUOTE_KEY} rate {v}"),
        }
    }
}

impl std::error::Error for RateFetchError {}

pub struct FxClient {
    client: Client,
    url: String,
    access_key: Option<String>,
}

impl FxClient {
    pub fn new(url: impl Into<String>, access_key: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            access_key,
        })
    }

    /// Build from `.env` / environment. A missing key is not an error here:
    /// fetches fail with `MissingAccessKey` and the caller falls back.
    pub fn from_env(timeout: Duration) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let access_key = std::env::var(ACCESS_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
        let url = std::env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_FX_URL.to_string());
        Self::new(url, access_key, timeout)
    }
}

impl RateSource for FxClient {
    fn fetch_rate(&self) -> Result<f64, RateFetchError> {
        let key = self.access_key.as_deref().ok_or(RateFetchError::MissingAccessKey)?;

        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("access_key", key),
                ("source", SOURCE_CURRENCY),
                ("currencies", TARGET_CURRENCY),
                ("format", "1"),
            ])
            .send()
            .map_err(|e| RateFetchError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RateFetchError::Status(resp.status().as_u16()));
        }

        let body = resp.text().map_err(|e| RateFetchError::Request(e.to_string()))?;
        parse_live_response(&body)
    }
}

/// A rate fixed by the user; never fails.
#[derive(Debug, Clone, Copy)]
pub struct PinnedRate(pub f64);

impl RateSource for PinnedRate {
    fn fetch_rate(&self) -> Result<f64, RateFetchError> {
        Ok(self.0)
    }

    fn origin(&self) -> RateOrigin {
        RateOrigin::Pinned
    }
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    quotes: Option<HashMap<String, f64>>,
}

fn parse_live_response(body: &str) -> Result<f64, RateFetchError> {
    let parsed: LiveResponse =
        serde_json::from_str(body).map_err(|e| RateFetchError::Parse(e.to_string()))?;

    if !parsed.success {
        return Err(RateFetchError::Unsuccessful(body.trim().to_string()));
    }

    let rate = parsed
        .quotes
        .as_ref()
        .and_then(|q| q.get(QUOTE_KEY))
        .copied()
        .ok_or_else(|| RateFetchError::MissingQuote(body.trim().to_string()))?;

    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(RateFetchError::InvalidRate(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, key: Option<&str>) -> FxClient {
        FxClient::new(server.url("/live"), key.map(str::to_string), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn fetches_live_quote() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/live")
                .query_param("access_key", "test-key")
                .query_param("source", "USD")
                .query_param("currencies", "INR");
            then.status(200)
                .json_body(json!({ "success": true, "quotes": { "USDINR": 83.42 } }));
        });

        let rate = client_for(&server, Some("test-key")).fetch_rate().unwrap();
        mock.assert();
        assert_eq!(rate, 83.42);
    }

    #[test]
    fn unsuccessful_response_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/live");
            then.status(200)
                .json_body(json!({ "success": false, "error": { "code": 101 } }));
        });

        let err = client_for(&server, Some("bad")).fetch_rate().unwrap_err();
        assert!(matches!(err, RateFetchError::Unsuccessful(_)), "{err:?}");
    }

    #[test]
    fn http_error_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/live");
            then.status(503);
        });

        let err = client_for(&server, Some("k")).fetch_rate().unwrap_err();
        assert_eq!(err, RateFetchError::Status(503));
    }

    #[test]
    fn missing_key_skips_the_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/live");
            then.status(200);
        });

        let err = client_for(&server, None).fetch_rate().unwrap_err();
        assert_eq!(err, RateFetchError::MissingAccessKey);
        mock.assert_hits(0);
    }

    #[test]
    fn response_shape_checks() {
        assert!(matches!(
            parse_live_response(r#"{"success":true,"quotes":{"USDEUR":0.9}}"#),
            Err(RateFetchError::MissingQuote(_))
        ));
        assert!(matches!(
            parse_live_response(r#"{"success":true}"#),
            Err(RateFetchError::MissingQuote(_))
        ));
        assert!(matches!(parse_live_response("<html>"), Err(RateFetchError::Parse(_))));
        assert_eq!(
            parse_live_response(r#"{"success":true,"quotes":{"USDINR":-1.0}}"#),
            Err(RateFetchError::InvalidRate(-1.0))
        );
    }
}
