//! Client example demonstrating the full conversion flow against a running server.
//!
//! A stand-in rate API is served locally, so no real API key is needed.
//!
//! Run with: cargo run -p fx-app --example client_example

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{Json, Router, extract::Query, routing::get};
use serde_json::json;
use tokio::net::TcpListener;

use fx_adapters::{CachedRateProvider, DEFAULT_RATE_TTL, InMemorySessionStore, SwopClient, security};
use fx_client::FxClient;
use fx_hex::{ConversionService, inbound::HttpServer};

/// EUR-based rates served by the stand-in upstream.
const RATES: &[(&str, f64)] = &[
    ("EUR", 1.0),
    ("USD", 1.10),
    ("GBP", 0.90),
    ("JPY", 160.0),
];

async fn fake_rates(Query(query): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let wanted = query.get("quote_currency").cloned().unwrap_or_default();
    let rows: Vec<_> = RATES
        .iter()
        .filter(|(code, _)| *code == wanted)
        .map(|(code, quote)| json!({"base_currency": "EUR", "quote_currency": code, "quote": quote}))
        .collect();
    Json(json!(rows))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Stand-in rate API
    let upstream = TcpListener::bind("127.0.0.1:0").await?;
    let upstream_addr = upstream.local_addr()?;
    tokio::spawn(async move {
        let app = Router::new().route("/rates", get(fake_rates));
        if let Err(e) = axum::serve(upstream, app).await {
            eprintln!("upstream stopped: {e}");
        }
    });

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();

    println!("🚀 Starting server on port {port}...");
    println!("   Rate API: http://{upstream_addr}");

    let client = SwopClient::new(
        format!("http://{upstream_addr}"),
        "demo-key",
        fx_adapters::DEFAULT_TIMEOUT,
    )?;
    let service = ConversionService::new(CachedRateProvider::new(client, DEFAULT_RATE_TTL));
    let server = HttpServer::new(
        service,
        InMemorySessionStore::default(),
        security::generate_secret(),
    );
    let router = server.router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            eprintln!("server stopped: {e}");
        }
    });

    // Wait for server to start
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let base_url = format!("http://127.0.0.1:{port}");
    let client = FxClient::new(&base_url)?;

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: Full conversion flow
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let result = client.convert(100.0, "USD", "GBP").await?;
    println!(
        "✅ Open conversion: {} {} = {} (rate {})",
        result.amount, result.from, result.formatted, result.rate
    );

    let response = client.convert(-5.0, "USD", "GBP").await;
    assert!(response.is_err());
    println!("✅ Negative amount rejected: {}", response.unwrap_err());

    let response = client.convert_authenticated(100.0, "USD", "GBP").await;
    assert!(response.is_err());
    println!("✅ POST without login rejected: {}", response.unwrap_err());

    let session = client.session().await?;
    println!("✅ Session before login: authenticated={}", session.authenticated);

    let login = client.login("alice").await?;
    println!("✅ Logged in as {:?}", login.user);

    let result = client.convert_authenticated(250.0, "GBP", "JPY").await?;
    println!(
        "✅ Authenticated conversion: {} {} = {}",
        result.amount, result.from, result.formatted
    );

    let german = FxClient::new(&base_url)?.with_locale("de-DE");
    let result = german.convert(1000.0, "USD", "EUR").await?;
    println!("✅ German formatting: {}", result.formatted);

    client.logout().await?;
    let session = client.session().await?;
    println!("✅ Session after logout: authenticated={}", session.authenticated);

    println!();
    println!("🎉 Demo complete!");

    Ok(())
}
