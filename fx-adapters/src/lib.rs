//! # FX Adapters
//!
//! Outbound adapters for the conversion service:
//! - `swop` - HTTP client for the upstream EUR rate API
//! - `cache` / `provider` - TTL cache-aside in front of the rate client
//! - `metrics` - best-effort InfluxDB line-protocol sink
//! - `sessions` - in-memory session store
//! - `security` - session secrets and CSRF tokens

pub mod cache;
pub mod metrics;
pub mod provider;
pub mod security;
pub mod sessions;
pub mod swop;

pub use cache::{TtlCache, cache_key};
pub use metrics::InfluxMetrics;
pub use provider::{CachedRateProvider, DEFAULT_RATE_TTL};
pub use sessions::{DEFAULT_IDLE_TIMEOUT, InMemorySessionStore};
pub use swop::{DEFAULT_TIMEOUT, SwopClient};
