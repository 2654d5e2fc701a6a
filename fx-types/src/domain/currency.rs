//! Currency codes and EUR-based quotes.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// A normalized ISO-4217-shaped currency code (`^[A-Z]{3}$`).
///
/// Construction always goes through [`CurrencyCode::parse`], so a value of
/// this type is known to be well-formed before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "USD")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Trims, upper-cases and validates `input`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let code = input.trim().to_uppercase();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(DomainError::InvalidCurrencyCode(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// How many units of `currency` one EUR buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    currency: CurrencyCode,
    rate_from_eur: f64,
}

impl ExchangeQuote {
    /// Returns `None` unless `rate_from_eur` is finite and strictly positive.
    pub fn new(currency: CurrencyCode, rate_from_eur: f64) -> Option<Self> {
        exchange_rates::is_valid_rate(rate_from_eur).then_some(Self {
            currency,
            rate_from_eur,
        })
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn rate_from_eur(&self) -> f64 {
        self.rate_from_eur
    }
}
