//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fx_types::domain::{ConversionResult, RateSource};
use fx_types::dto::{
    AmountInput, ConvertParams, CsrfTokenResponse, ErrorResponse, LoginRequest, LoginResponse,
    SessionResponse,
};
use fx_types::error::FieldViolation;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Get the CSRF token for the current session
#[utoipa::path(
    get,
    path = "/api/csrf",
    tag = "session",
    responses(
        (status = 200, description = "Token for the session cookie (set if absent)", body = CsrfTokenResponse)
    )
)]
async fn csrf() {}

/// Get the current session state
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "session",
    responses(
        (status = 200, description = "Session state", body = SessionResponse)
    )
)]
async fn session() {}

/// Log in with a username
#[utoipa::path(
    post,
    path = "/api/session/login",
    tag = "session",
    request_body = LoginRequest,
    security(("csrf_token" = [])),
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 403, description = "Invalid CSRF token", body = ErrorResponse),
        (status = 422, description = "Username required", body = ErrorResponse)
    )
)]
async fn login() {}

/// Log out and drop the session
#[utoipa::path(
    post,
    path = "/api/session/logout",
    tag = "session",
    security(("csrf_token" = [])),
    responses(
        (status = 200, description = "Logged out", body = LoginResponse),
        (status = 403, description = "Invalid CSRF token", body = ErrorResponse)
    )
)]
async fn logout() {}

/// Convert an amount (query parameters, no login required)
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "conversion",
    params(
        ("amount" = String, Query, description = "Amount in the source currency, ≥ 0", example = "100"),
        ("from" = String, Query, description = "Source currency code", example = "USD"),
        ("to" = String, Query, description = "Target currency code", example = "GBP"),
        ("Accept-Language" = Option<String>, Header, description = "Locale used for `formatted`")
    ),
    responses(
        (status = 200, description = "Conversion result", body = ConversionResult),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded"),
        (status = 502, description = "Rate API error", body = ErrorResponse)
    )
)]
async fn convert_query() {}

/// Convert an amount (JSON body, login and CSRF token required)
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "conversion",
    request_body = ConvertParams,
    security(("csrf_token" = [])),
    params(
        ("Accept-Language" = Option<String>, Header, description = "Locale used for `formatted`")
    ),
    responses(
        (status = 200, description = "Conversion result", body = ConversionResult),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Invalid CSRF token", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded"),
        (status = 502, description = "Rate API error", body = ErrorResponse)
    )
)]
async fn convert_json() {}

/// OpenAPI documentation for the conversion API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Conversion API",
        version = "1.0.0",
        description = "Converts amounts between currencies using EUR-based rates.\n\n## Sessions\n\n`GET /api/convert` is open. Everything that changes state needs the `FXSESSID` session cookie and the matching token from `GET /api/csrf` in the `X-CSRF-Token` header. `POST /api/convert` additionally requires a logged-in session.",
        license(name = "MIT"),
    ),
    paths(
        health,
        csrf,
        session,
        login,
        logout,
        convert_query,
        convert_json,
    ),
    components(
        schemas(
            ConvertParams,
            AmountInput,
            ConversionResult,
            RateSource,
            CsrfTokenResponse,
            SessionResponse,
            LoginRequest,
            LoginResponse,
            ErrorResponse,
            FieldViolation,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Session, login and CSRF token"),
        (name = "conversion", description = "Currency conversion"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the CSRF header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "csrf_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-CSRF-Token"))),
            );
        }
    }
}
