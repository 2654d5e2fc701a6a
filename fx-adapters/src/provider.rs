//! Cache-aside rate provider.
//!
//! Wraps any [`ExchangeRateClient`] and keeps each EUR quote for a fixed TTL.
//! Failures are never cached, so the next call after an upstream error goes
//! straight back to the client.

use std::time::Duration;

use tracing::instrument;

use fx_types::{CurrencyCode, ExchangeQuote, ExchangeRateClient, RateError, RateProvider};

use crate::cache::{TtlCache, cache_key};

/// Default lifetime of a cached quote.
pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(3600);

pub struct CachedRateProvider<C: ExchangeRateClient> {
    client: C,
    cache: TtlCache<f64>,
    ttl: Duration,
}

impl<C: ExchangeRateClient> CachedRateProvider<C> {
    pub fn new(client: C, ttl: Duration) -> Self {
        Self {
            client,
            cache: TtlCache::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait::async_trait]
impl<C: ExchangeRateClient> RateProvider for CachedRateProvider<C> {
    #[instrument(skip(self))]
    async fn eur_to_quote(&self, currency_code: &str) -> Result<ExchangeQuote, RateError> {
        let code = CurrencyCode::parse(currency_code)?;
        let key = cache_key(&["rate", "EUR", code.as_str()]);

        let client = &self.client;
        let wanted = &code;
        let rate = self
            .cache
            .get_or_compute(&key, self.ttl, move || async move {
                client
                    .fetch_quote(wanted)
                    .await
                    .map(|q| q.rate_from_eur())
            })
            .await?;

        ExchangeQuote::new(code.clone(), rate)
            .ok_or_else(|| RateError::RateNotFound(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_types::{DomainError, ExternalApiError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client that serves fixed quotes and counts its calls.
    struct CountingClient {
        calls: AtomicUsize,
        fail_next: Mutex<Option<RateError>>,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_next: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ExchangeRateClient for CountingClient {
        async fn fetch_quote(&self, currency: &CurrencyCode) -> Result<ExchangeQuote, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_next.lock().unwrap().take() {
                return Err(err);
            }
            let rate = match currency.as_str() {
                "USD" => 1.1,
                "GBP" => 0.9,
                other => return Err(RateError::RateNotFound(other.to_string())),
            };
            Ok(ExchangeQuote::new(currency.clone(), rate).unwrap())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_is_served_from_cache() {
        let client = std::sync::Arc::new(CountingClient::new());
        let provider = CachedRateProvider::new(client.clone(), DEFAULT_RATE_TTL);

        let first = provider.eur_to_quote("usd").await.unwrap();
        let second = provider.eur_to_quote(" USD ").await.unwrap();

        assert_eq!(first.rate_from_eur(), 1.1);
        assert_eq!(first, second);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_ttl() {
        let provider = CachedRateProvider::new(CountingClient::new(), Duration::from_secs(10));

        provider.eur_to_quote("GBP").await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        provider.eur_to_quote("GBP").await.unwrap();

        assert_eq!(provider.client.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_code_never_reaches_client() {
        let provider = CachedRateProvider::new(CountingClient::new(), DEFAULT_RATE_TTL);

        let err = provider.eur_to_quote("US").await.unwrap_err();
        assert_eq!(
            err,
            RateError::Domain(DomainError::InvalidCurrencyCode("US".into()))
        );
        assert_eq!(provider.client.calls(), 0);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let client = CountingClient::new();
        *client.fail_next.lock().unwrap() = Some(ExternalApiError::Timeout.into());
        let provider = CachedRateProvider::new(client, DEFAULT_RATE_TTL);

        let err = provider.eur_to_quote("USD").await.unwrap_err();
        assert_eq!(err, RateError::ExternalApi(ExternalApiError::Timeout));

        let ok = provider.eur_to_quote("USD").await.unwrap();
        assert_eq!(ok.rate_from_eur(), 1.1);
        assert_eq!(provider.client.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_rate_propagates() {
        let provider = CachedRateProvider::new(CountingClient::new(), DEFAULT_RATE_TTL);
        let err = provider.eur_to_quote("JPY").await.unwrap_err();
        assert_eq!(err, RateError::RateNotFound("JPY".into()));
    }
}
