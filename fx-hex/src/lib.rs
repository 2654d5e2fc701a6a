//! # FX Hex
//!
//! Application service layer and HTTP adapter for the currency conversion API.
//!
//! ## Architecture
//!
//! - `service/` - Conversion service (validation, rates, calculation, formatting)
//! - `inbound/` - HTTP adapter (Axum server, sessions, CSRF, rate limiting)
//!
//! The service is generic over `P: RateProvider`, and the HTTP adapter over
//! `S: SessionStore`, so both can be swapped without touching handlers.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::ConversionService;
