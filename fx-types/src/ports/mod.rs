//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod metrics;
mod rates;
mod session;

pub use metrics::{FieldValue, MetricsSink, NoopMetrics};
pub use rates::{ExchangeRateClient, RateProvider};
pub use session::SessionStore;
