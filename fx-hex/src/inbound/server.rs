//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use fx_types::{RateProvider, SessionStore};

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use super::session::CSRF_HEADER;
use crate::ConversionService;
use crate::openapi::ApiDoc;

/// HTTP Server for the conversion API.
pub struct HttpServer<P: RateProvider, S: SessionStore> {
    state: Arc<AppState<P, S>>,
    rate_limiter: Arc<RateLimiterState>,
    cors_origin: Option<HeaderValue>,
}

impl<P: RateProvider, S: SessionStore> HttpServer<P, S> {
    /// Creates a new HTTP server with the default rate limit (100 req/min).
    pub fn new(service: ConversionService<P>, sessions: S, csrf_secret: impl Into<String>) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                sessions,
                csrf_secret: csrf_secret.into(),
            }),
            rate_limiter: Arc::new(RateLimiterState::default()),
            cors_origin: None,
        }
    }

    /// Replaces the per-client quota on the conversion routes.
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.rate_limiter = Arc::new(RateLimiterState::new(
            requests_per_minute,
            Duration::from_secs(60),
        ));
        self
    }

    /// Allows credentialed cross-origin calls from `origin`.
    pub fn with_cors_origin(mut self, origin: &str) -> anyhow::Result<Self> {
        self.cors_origin = Some(HeaderValue::from_str(origin)?);
        Ok(self)
    }

    /// Shared application state.
    pub fn state(&self) -> &Arc<AppState<P, S>> {
        &self.state
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let convert = Router::new()
            .route(
                "/api/convert",
                get(handlers::convert_query::<P, S>).post(handlers::convert_json::<P, S>),
            )
            .route_layer(middleware::from_fn_with_state(
                (self.rate_limiter.clone(), self.state.clone()),
                rate_limit_middleware::<P, S>,
            ));

        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/csrf", get(handlers::csrf_token::<P, S>))
            .route("/api/session", get(handlers::session_info::<P, S>))
            .route("/api/session/login", post(handlers::login::<P, S>))
            .route("/api/session/logout", post(handlers::logout::<P, S>))
            .merge(convert)
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

        match &self.cors_origin {
            Some(origin) => router.layer(cors_layer(origin.clone())),
            None => router,
        }
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT_LANGUAGE,
            HeaderName::from_static(CSRF_HEADER),
        ])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
