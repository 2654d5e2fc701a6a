//! # FX Client SDK
//!
//! A typed Rust client for the currency conversion API.
//!
//! The client keeps a cookie jar, so the session started by the first call
//! carries over to login, CSRF-protected requests and logout.

use fx_types::{
    ConversionResult, ConvertParams, CsrfTokenResponse, LoginRequest, LoginResponse,
    SessionResponse,
};
use reqwest::{Client, RequestBuilder, header};
use serde::de::DeserializeOwned;

/// Header carrying the CSRF token on state-changing requests.
const CSRF_HEADER: &str = "X-CSRF-Token";

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Conversion API client.
pub struct FxClient {
    base_url: String,
    locale: Option<String>,
    http: Client,
}

impl FxClient {
    /// Creates a new client with an empty cookie jar.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            locale: None,
            http,
        })
    }

    /// Sends `Accept-Language: <locale>` with every request.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Fetches the CSRF token for this client's session.
    pub async fn csrf_token(&self) -> Result<String, ClientError> {
        let resp: CsrfTokenResponse = self.send(self.request_get("/api/csrf")).await?;
        Ok(resp.token)
    }

    /// Returns the current session state.
    pub async fn session(&self) -> Result<SessionResponse, ClientError> {
        self.send(self.request_get("/api/session")).await
    }

    /// Logs in as `username`.
    pub async fn login(&self, username: &str) -> Result<LoginResponse, ClientError> {
        let token = self.csrf_token().await?;
        let body = LoginRequest {
            username: username.to_string(),
        };
        let req = self
            .request_post("/api/session/login")
            .header(CSRF_HEADER, token)
            .json(&body);
        self.send(req).await
    }

    /// Logs out and drops the session.
    pub async fn logout(&self) -> Result<LoginResponse, ClientError> {
        let token = self.csrf_token().await?;
        let req = self
            .request_post("/api/session/logout")
            .header(CSRF_HEADER, token);
        self.send(req).await
    }

    /// Converts through the open query route.
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ClientError> {
        let amount = amount.to_string();
        let req = self
            .request_get("/api/convert")
            .query(&[("amount", amount.as_str()), ("from", from), ("to", to)]);
        self.send(req).await
    }

    /// Converts through the JSON route. Needs a logged-in session.
    pub async fn convert_authenticated(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ClientError> {
        let token = self.csrf_token().await?;
        let req = self
            .request_post("/api/convert")
            .header(CSRF_HEADER, token)
            .json(&ConvertParams::new(amount, from, to));
        self.send(req).await
    }

    fn request_get(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.http.get(format!("{}{}", self.base_url, path)))
    }

    fn request_post(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.http.post(format!("{}{}", self.base_url, path)))
    }

    fn with_headers(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.locale {
            Some(locale) => req.header(header::ACCEPT_LANGUAGE, locale),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use serde_json::json;

    #[test]
    fn test_client_with_trailing_slash() {
        let client = FxClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_locale() {
        let client = FxClient::new("http://localhost:3000")
            .unwrap()
            .with_locale("de-DE");
        assert_eq!(client.locale.as_deref(), Some("de-DE"));
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_cookie_carries_over_between_calls() {
        let app = Router::new()
            .route(
                "/api/csrf",
                get(|| async {
                    (
                        [("set-cookie", "FXSESSID=abc; Path=/; HttpOnly")],
                        Json(json!({"token": "t0k"})),
                    )
                }),
            )
            .route(
                "/api/session",
                get(|headers: HeaderMap| async move {
                    let cookie = headers
                        .get("cookie")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({"authenticated": cookie.contains("FXSESSID=abc"), "user": null}))
                }),
            );
        let client = FxClient::new(spawn(app).await).unwrap();

        assert_eq!(client.csrf_token().await.unwrap(), "t0k");
        assert!(client.session().await.unwrap().authenticated);
    }

    #[tokio::test]
    async fn test_api_error_uses_error_field() {
        let app = Router::new().route(
            "/api/convert",
            get(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"error": "Validation failed", "code": 422})),
                )
            }),
        );
        let client = FxClient::new(spawn(app).await).unwrap();

        match client.convert(-1.0, "USD", "EUR").await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "Validation failed");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_locale_header_is_sent() {
        let app = Router::new().route(
            "/api/convert",
            get(|headers: HeaderMap| async move {
                let locale = headers
                    .get("accept-language")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "amount": 1.0,
                    "from": "EUR",
                    "to": "EUR",
                    "rate": 1.0,
                    "converted": 1.0,
                    "formatted": locale,
                    "source": "cache",
                    "timestamp": "2024-01-01T00:00:00Z"
                }))
            }),
        );
        let client = FxClient::new(spawn(app).await)
            .unwrap()
            .with_locale("fr-FR");

        let result = client.convert(1.0, "EUR", "EUR").await.unwrap();
        assert_eq!(result.formatted, "fr-FR");
    }
}
