//! Exchange rate ports.
//!
//! `ExchangeRateClient` is the raw upstream call; `RateProvider` is what the
//! service consumes and may put a cache in front of the client.

use std::sync::Arc;

use crate::domain::{CurrencyCode, ExchangeQuote};
use crate::error::RateError;

/// Port trait for the upstream EUR-based rate API.
#[async_trait::async_trait]
pub trait ExchangeRateClient: Send + Sync + 'static {
    /// Fetches the EUR→`currency` quote. One outbound call per invocation.
    async fn fetch_quote(&self, currency: &CurrencyCode) -> Result<ExchangeQuote, RateError>;
}

/// Port trait for resolving EUR quotes on behalf of the service.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Normalizes `currency_code` and returns how many units of it one EUR buys.
    ///
    /// Upstream errors are propagated unchanged.
    async fn eur_to_quote(&self, currency_code: &str) -> Result<ExchangeQuote, RateError>;
}

#[async_trait::async_trait]
impl<T: ExchangeRateClient + ?Sized> ExchangeRateClient for Arc<T> {
    async fn fetch_quote(&self, currency: &CurrencyCode) -> Result<ExchangeQuote, RateError> {
        (**self).fetch_quote(currency).await
    }
}

#[async_trait::async_trait]
impl<T: RateProvider + ?Sized> RateProvider for Arc<T> {
    async fn eur_to_quote(&self, currency_code: &str) -> Result<ExchangeQuote, RateError> {
        (**self).eur_to_quote(currency_code).await
    }
}
