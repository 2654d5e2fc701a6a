//! HTTP client for the SWOP exchange rate API.
//!
//! `GET {base}/rates?base_currency=EUR&quote_currency=XXX` returns an array of
//! loosely shaped rows. Each row is decoded on its own; rows that do not
//! decode are skipped rather than failing the whole payload.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use fx_types::{CurrencyCode, ExchangeQuote, ExchangeRateClient, ExternalApiError, RateError};

const RATES_ENDPOINT: &str = "/rates";
const BASE_CURRENCY: &str = "EUR";

/// Default upstream request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct SwopClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SwopClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait::async_trait]
impl ExchangeRateClient for SwopClient {
    #[instrument(skip(self), fields(currency = %currency))]
    async fn fetch_quote(&self, currency: &CurrencyCode) -> Result<ExchangeQuote, RateError> {
        let url = format!("{}{}", self.base_url, RATES_ENDPOINT);
        let resp = self
            .http
            .get(&url)
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .header("Accept", "application/json")
            .query(&[
                ("base_currency", BASE_CURRENCY),
                ("quote_currency", currency.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "rate API returned an error status");
            return Err(ExternalApiError::Status(status.as_u16()).into());
        }

        let body = resp.bytes().await.map_err(transport_error)?;
        let rows: Vec<serde_json::Value> =
            serde_json::from_slice(&body).map_err(|_| ExternalApiError::MalformedPayload)?;
        debug!(rows = rows.len(), "rate API payload received");

        let rate = select_quote(rows, currency.as_str())
            .ok_or_else(|| RateError::RateNotFound(currency.to_string()))?;
        ExchangeQuote::new(currency.clone(), rate)
            .ok_or_else(|| RateError::RateNotFound(currency.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> ExternalApiError {
    if err.is_timeout() {
        warn!("rate API timed out");
        ExternalApiError::Timeout
    } else {
        warn!(error = %err, "rate API request failed");
        ExternalApiError::Transport(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    quote_currency: String,
    #[serde(default)]
    quote: Option<Numeric>,
    #[serde(default)]
    rate: Option<Numeric>,
}

#[derive(Debug, Clone, PartialEq)]
struct QuoteRow {
    quote_currency: String,
    quote: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Row {
    Quote(QuoteRow),
    Skip,
}

fn parse_row(value: serde_json::Value) -> Row {
    let Ok(raw) = serde_json::from_value::<RawRow>(value) else {
        return Row::Skip;
    };
    // `quote` wins over `rate` whenever it is present.
    match raw.quote.or(raw.rate).and_then(|n| n.value()) {
        Some(quote) if quote.is_finite() => Row::Quote(QuoteRow {
            quote_currency: raw.quote_currency,
            quote,
        }),
        _ => Row::Skip,
    }
}

/// The quote of the first decodable row whose currency matches `code`.
fn select_quote(rows: Vec<serde_json::Value>, code: &str) -> Option<f64> {
    rows.into_iter()
        .map(parse_row)
        .find_map(|row| match row {
            Row::Quote(q) if q.quote_currency.eq_ignore_ascii_case(code) => Some(q.quote),
            _ => None,
        })
}
