//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// An amount as sent by the client: a JSON number or a numeric string.
///
/// Query strings always arrive as text, JSON bodies usually as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

/// Untrusted conversion input (`GET` query or `POST` body).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConvertParams {
    /// Amount in the source currency (must be ≥ 0)
    #[schema(value_type = Option<f64>, example = 100.0)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<AmountInput>,
    /// Source currency code
    #[schema(example = "USD")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Target currency code
    #[schema(example = "GBP")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl ConvertParams {
    pub fn new(amount: f64, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            amount: Some(AmountInput::Number(amount)),
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// CSRF token bound to the caller's session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CsrfTokenResponse {
    pub token: String,
}

/// Current session state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[schema(example = "alice")]
    pub user: Option<String>,
}

/// Login body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    #[serde(default)]
    pub username: String,
}

/// Result of a login or logout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Validation failed")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    #[schema(example = 422)]
    pub code: u16,
}
