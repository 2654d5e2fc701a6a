//! # FX Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the rate client, cache and metrics adapters
//! - Create the conversion service and session store
//! - Start the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_adapters::{
    CachedRateProvider, InMemorySessionStore, InfluxMetrics, SwopClient, security,
};
use fx_hex::{ConversionService, inbound::HttpServer};
use fx_types::{MetricsSink, NoopMetrics};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Endpoint comes from OTEL_EXPORTER_OTLP_ENDPOINT
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fx-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;

    let otel = match &config.otlp_endpoint {
        Some(_) => Some(init_tracer()?),
        None => None,
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,fx_app=debug,fx_hex=debug,fx_adapters=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting conversion server on port {}", config.port);
    tracing::info!(
        base_url = %config.swop_base_url,
        ttl_secs = config.rate_cache_ttl.as_secs(),
        "Using rate API"
    );

    let client = SwopClient::new(
        config.swop_base_url.clone(),
        config.swop_api_key.clone(),
        config.swop_timeout,
    )?;
    let rates = CachedRateProvider::new(client, config.rate_cache_ttl);

    let metrics: Arc<dyn MetricsSink> = match config
        .influx
        .as_ref()
        .and_then(|i| InfluxMetrics::new(&i.url, &i.token, &i.org, &i.bucket))
    {
        Some(sink) => {
            tracing::info!("Metrics enabled");
            Arc::new(sink)
        }
        None => {
            tracing::info!("Metrics disabled (INFLUX_* not fully configured)");
            Arc::new(NoopMetrics)
        }
    };
    let service = ConversionService::with_metrics(rates, metrics);

    let secret = match config.app_secret.clone() {
        Some(secret) => secret,
        None => {
            let secret = security::generate_secret();
            tracing::warn!(
                fingerprint = %security::secret_fingerprint(&secret),
                "APP_SECRET not set, using a random secret; sessions will not survive a restart"
            );
            secret
        }
    };

    let sessions = InMemorySessionStore::new(config.session_idle);
    let mut server = HttpServer::new(service, sessions, secret)
        .with_rate_limit(config.rate_limit_per_minute);
    if let Some(origin) = &config.cors_allowed_origin {
        tracing::info!(%origin, "CORS enabled");
        server = server.with_cors_origin(origin)?;
    }

    let state = server.state().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = state.sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "expired sessions removed");
            }
        }
    });

    let addr = format!("0.0.0.0:{}", config.port);
    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
