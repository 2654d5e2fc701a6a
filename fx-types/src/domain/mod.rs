//! Domain models for the conversion service.

pub mod conversion;
pub mod currency;
pub mod session;

pub use conversion::{ConversionRequest, ConversionResult, RateSource};
pub use currency::{CurrencyCode, ExchangeQuote};
pub use session::{RequestContext, SessionData, SessionId};
