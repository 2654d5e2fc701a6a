//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod handlers;
mod rate_limit;
mod server;
mod session;

pub use handlers::{ApiError, AppState};
pub use rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiterState};
pub use server::HttpServer;
pub use session::{CSRF_HEADER, CSRF_INTENT, SESSION_COOKIE};
