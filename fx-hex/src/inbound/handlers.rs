//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header::ACCEPT_LANGUAGE},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use fx_adapters::security;
use fx_types::{
    AppError, ConversionError, ConversionResult, ConvertParams, CsrfTokenResponse, ErrorResponse,
    LoginRequest, LoginResponse, RateProvider, RequestContext, SessionError, SessionResponse,
    SessionStore,
};

use super::session::{self, CSRF_INTENT};
use crate::ConversionService;

/// Application state shared across handlers.
pub struct AppState<P: RateProvider, S: SessionStore> {
    pub service: ConversionService<P>,
    pub sessions: S,
    pub csrf_secret: String,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        ApiError(err.into())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self.0 {
            AppError::Unprocessable { message, details } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, details)
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::BadGateway { message, details } => (
                StatusCode::BAD_GATEWAY,
                message,
                Some(serde_json::Value::String(details)),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error,
            details,
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Issue the CSRF token for the caller's session, starting one if needed.
#[tracing::instrument(skip(state, jar))]
pub async fn csrf_token<P: RateProvider, S: SessionStore>(
    State(state): State<Arc<AppState<P, S>>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, current) = session::load_or_start(&state.sessions, jar).await?;
    let token = security::csrf_token(&state.csrf_secret, &current.id, CSRF_INTENT);
    Ok((jar, Json(CsrfTokenResponse { token })))
}

/// Report whether the caller is logged in.
#[tracing::instrument(skip(state, jar))]
pub async fn session_info<P: RateProvider, S: SessionStore>(
    State(state): State<Arc<AppState<P, S>>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, current) = session::load_or_start(&state.sessions, jar).await?;
    Ok((
        jar,
        Json(SessionResponse {
            authenticated: current.data.is_authenticated(),
            user: current.data.user,
        }),
    ))
}

/// Attach a username to the caller's session.
#[tracing::instrument(skip(state, jar, headers, body))]
pub async fn login<P: RateProvider, S: SessionStore>(
    State(state): State<Arc<AppState<P, S>>>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let current = session::load_existing(&state.sessions, &jar)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid CSRF token".into()))?;
    session::verify_csrf(&state.csrf_secret, &current.id, &headers)?;

    let req: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Unprocessable {
            message: "Username required".into(),
            details: None,
        }
        .into());
    }

    state.sessions.set_user(&current.id, username).await?;
    tracing::info!(user = %username, "user logged in");

    Ok(Json(LoginResponse {
        ok: true,
        user: Some(username.to_string()),
    }))
}

/// End the caller's session.
#[tracing::instrument(skip(state, jar, headers))]
pub async fn logout<P: RateProvider, S: SessionStore>(
    State(state): State<Arc<AppState<P, S>>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let current = session::load_existing(&state.sessions, &jar)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid CSRF token".into()))?;
    session::verify_csrf(&state.csrf_secret, &current.id, &headers)?;

    state.sessions.destroy(&current.id).await?;
    tracing::info!(user = ?current.user(), "session ended");

    Ok((
        session::clear_session_cookie(jar),
        Json(LoginResponse {
            ok: true,
            user: None,
        }),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Convert an amount given as query parameters. Open to anonymous callers.
#[tracing::instrument(skip(state, jar, headers, params))]
pub async fn convert_query<P: RateProvider, S: SessionStore>(
    State(state): State<Arc<AppState<P, S>>>,
    jar: CookieJar,
    headers: HeaderMap,
    params: Result<Query<ConvertParams>, QueryRejection>,
) -> Result<Json<ConversionResult>, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let user = session::load_existing(&state.sessions, &jar)
        .await?
        .and_then(|s| s.data.user);

    let ctx = request_context(user, &headers);
    let result = state.service.convert(&params, &ctx).await?;
    Ok(Json(result))
}

/// Convert an amount given as a JSON body. Requires a logged-in session and
/// a valid CSRF token.
#[tracing::instrument(skip(state, jar, headers, body))]
pub async fn convert_json<P: RateProvider, S: SessionStore>(
    State(state): State<Arc<AppState<P, S>>>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ConversionResult>, ApiError> {
    let current = session::load_existing(&state.sessions, &jar)
        .await?
        .filter(|s| s.data.is_authenticated())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;
    session::verify_csrf(&state.csrf_secret, &current.id, &headers)?;

    let params: ConvertParams = serde_json::from_slice(&body).unwrap_or_default();
    let ctx = request_context(current.data.user, &headers);
    let result = state.service.convert(&params, &ctx).await?;
    Ok(Json(result))
}

fn request_context(user: Option<String>, headers: &HeaderMap) -> RequestContext {
    let ctx = RequestContext::new().with_user(user);
    match headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()) {
        Some(lang) => ctx.with_accept_language(lang),
        None => ctx,
    }
}
