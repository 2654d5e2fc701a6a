//! Conversion Application Service
//!
//! Orchestrates one conversion: validation, rate lookup through the provider
//! port, calculation, formatting and best-effort metrics.
//! Contains NO infrastructure logic - pure orchestration.

use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use exchange_rates::{LocaleFormat, normalize_locale};

use fx_types::{
    ConversionError, ConversionRequest, ConversionResult, ConvertParams, FieldValue, MetricsSink,
    NoopMetrics, RateProvider, RateSource, RequestContext,
};

const ROUTE_TAG: &str = "convert";

/// Application service for currency conversion.
///
/// Generic over `P: RateProvider` - the rate source is injected at compile
/// time, the metrics sink at runtime since it is optional.
pub struct ConversionService<P: RateProvider> {
    rates: P,
    metrics: Arc<dyn MetricsSink>,
}

impl<P: RateProvider> ConversionService<P> {
    /// Creates a service that records no metrics.
    pub fn new(rates: P) -> Self {
        Self::with_metrics(rates, Arc::new(NoopMetrics))
    }

    pub fn with_metrics(rates: P, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { rates, metrics }
    }

    /// Returns a reference to the underlying rate provider.
    pub fn rates(&self) -> &P {
        &self.rates
    }

    /// Converts `params.amount` from `params.from` to `params.to`.
    ///
    /// Validation failures return before any rate is fetched. Metrics are
    /// recorded on success and on upstream or unexpected failures, never on
    /// caller mistakes.
    #[tracing::instrument(
        skip(self, params, ctx),
        fields(from = ?params.from, to = ?params.to, user = ?ctx.user)
    )]
    pub async fn convert(
        &self,
        params: &ConvertParams,
        ctx: &RequestContext,
    ) -> Result<ConversionResult, ConversionError> {
        let started = Instant::now();
        let outcome = self.run(params, ctx).await;

        match &outcome {
            Ok(result) => {
                let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
                tracing::debug!(
                    converted = result.converted,
                    rate = result.rate,
                    duration_ms,
                    "conversion complete"
                );
                self.metrics.record(
                    "requests",
                    &[("duration_ms", FieldValue::Float(duration_ms))],
                    &[("route", ROUTE_TAG)],
                );
            }
            Err(err) => {
                if let Some(kind) = err.metric_kind() {
                    if kind == "unexpected" {
                        tracing::error!(error = %err, "conversion failed unexpectedly");
                    } else {
                        tracing::warn!(error = %err, "conversion failed upstream");
                    }
                    self.metrics.record(
                        "errors",
                        &[("count", FieldValue::Int(1))],
                        &[("route", ROUTE_TAG), ("error", kind)],
                    );
                }
            }
        }

        outcome
    }

    async fn run(
        &self,
        params: &ConvertParams,
        ctx: &RequestContext,
    ) -> Result<ConversionResult, ConversionError> {
        let request = ConversionRequest::from_params(params).map_err(ConversionError::Validation)?;

        let (source, target) = tokio::try_join!(
            self.rates.eur_to_quote(request.source.as_str()),
            self.rates.eur_to_quote(request.target.as_str()),
        )?;
        let eur_to_source = source.rate_from_eur();
        let eur_to_target = target.rate_from_eur();

        let converted = exchange_rates::convert(request.amount, eur_to_source, eur_to_target)?;
        let rate = exchange_rates::cross_rate(eur_to_source, eur_to_target)?;

        let locale = normalize_locale(ctx.locale_hint());
        let format = LocaleFormat::resolve(&locale).unwrap_or_else(|| {
            tracing::debug!(%locale, "no number format for locale, using en_US");
            LocaleFormat::en_us()
        });
        let formatted = format.format_currency(converted, request.target.as_str());

        Ok(ConversionResult {
            amount: request.amount,
            from: request.source.to_string(),
            to: request.target.to_string(),
            rate,
            converted,
            formatted,
            source: RateSource::Cache,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}
