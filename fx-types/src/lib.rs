//! # FX Types
//!
//! Domain types and port traits for the currency conversion service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Currency codes, quotes, conversion requests/results, sessions
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, rate, conversion and HTTP-facing error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ConversionRequest, ConversionResult, CurrencyCode, ExchangeQuote, RateSource, RequestContext,
    SessionData, SessionId,
};
pub use dto::*;
pub use error::{
    AppError, ConversionError, DomainError, ExternalApiError, FieldViolation, RateError,
    SessionError, ValidationErrors,
};
pub use ports::{ExchangeRateClient, FieldValue, MetricsSink, NoopMetrics, RateProvider, SessionStore};
