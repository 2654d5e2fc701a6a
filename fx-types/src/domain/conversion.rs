//! Conversion request validation and result value.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::CurrencyCode;
use crate::dto::{AmountInput, ConvertParams};
use crate::error::{FieldViolation, ValidationErrors};

const NOT_BLANK: &str = "This value should not be blank.";
const NOT_A_NUMBER: &str = "This value should be a valid number.";
const NEGATIVE: &str = "This value should be either positive or zero.";
const NOT_A_CURRENCY: &str = "This value is not a valid currency code.";

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl ConversionRequest {
    /// Builds a request from untrusted input, collecting every violation.
    pub fn from_params(params: &ConvertParams) -> Result<Self, ValidationErrors> {
        let mut violations = Vec::new();

        let amount = match parse_amount(params.amount.as_ref()) {
            Ok(amount) => Some(amount),
            Err(message) => {
                violations.push(FieldViolation::new("amount", message));
                None
            }
        };
        let source = currency_field("from", params.from.as_deref(), &mut violations);
        let target = currency_field("to", params.to.as_deref(), &mut violations);

        match (amount, source, target) {
            (Some(amount), Some(source), Some(target)) => Ok(Self {
                amount,
                source,
                target,
            }),
            _ => Err(ValidationErrors::new(violations)),
        }
    }
}

fn parse_amount(input: Option<&AmountInput>) -> Result<f64, &'static str> {
    let value = match input {
        None => return Err(NOT_BLANK),
        Some(AmountInput::Number(n)) => *n,
        Some(AmountInput::Text(s)) if s.trim().is_empty() => return Err(NOT_BLANK),
        Some(AmountInput::Text(s)) => s.trim().parse::<f64>().map_err(|_| NOT_A_NUMBER)?,
    };
    if !value.is_finite() {
        return Err(NOT_A_NUMBER);
    }
    if value < 0.0 {
        return Err(NEGATIVE);
    }
    Ok(value)
}

fn currency_field(
    field: &str,
    input: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<CurrencyCode> {
    match input.map(str::trim) {
        None | Some("") => {
            violations.push(FieldViolation::new(field, NOT_BLANK));
            None
        }
        Some(raw) => match CurrencyCode::parse(raw) {
            Ok(code) => Some(code),
            Err(_) => {
                violations.push(FieldViolation::new(field, NOT_A_CURRENCY));
                None
            }
        },
    }
}

/// Where the rates behind a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Resolved through the cache-aside provider (hit or miss).
    Cache,
    /// Fetched directly from the upstream API.
    Live,
}

/// Outcome of one conversion. Produced once per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResult {
    /// Amount in the source currency, as requested
    #[schema(example = 100.0)]
    pub amount: f64,
    #[schema(example = "USD")]
    pub from: String,
    #[schema(example = "GBP")]
    pub to: String,
    /// Source-to-target rate, rounded to 6 decimals
    #[schema(example = 0.818182)]
    pub rate: f64,
    /// Converted amount, rounded to 2 decimals
    #[schema(example = 81.82)]
    pub converted: f64,
    /// Converted amount as locale-aware currency text
    #[schema(example = "£81.82")]
    pub formatted: String,
    pub source: RateSource,
    /// RFC 3339 UTC timestamp
    #[schema(example = "2024-01-01T12:00:00Z")]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(amount: Option<AmountInput>, from: &str, to: &str) -> ConvertParams {
        ConvertParams {
            amount,
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    #[test]
    fn test_valid_request() {
        let req =
            ConversionRequest::from_params(&params(Some(AmountInput::Number(100.0)), "usd", " GBP"))
                .unwrap();
        assert_eq!(req.amount, 100.0);
        assert_eq!(req.source.as_str(), "USD");
        assert_eq!(req.target.as_str(), "GBP");
    }

    #[test]
    fn test_amount_from_text() {
        let req = ConversionRequest::from_params(&params(
            Some(AmountInput::Text(" 12.5 ".into())),
            "EUR",
            "USD",
        ))
        .unwrap();
        assert_eq!(req.amount, 12.5);
    }

    #[test]
    fn test_zero_amount_allowed() {
        assert!(
            ConversionRequest::from_params(&params(Some(AmountInput::Number(0.0)), "EUR", "USD"))
                .is_ok()
        );
    }

    #[test]
    fn test_negative_amount() {
        let err =
            ConversionRequest::from_params(&params(Some(AmountInput::Number(-1.0)), "USD", "EUR"))
                .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "amount");
        assert_eq!(err.violations()[0].message, NEGATIVE);
    }

    #[test]
    fn test_non_numeric_amount() {
        let err = ConversionRequest::from_params(&params(
            Some(AmountInput::Text("ten".into())),
            "USD",
            "EUR",
        ))
        .unwrap_err();
        assert_eq!(err.violations()[0].message, NOT_A_NUMBER);

        let err = ConversionRequest::from_params(&params(
            Some(AmountInput::Text("inf".into())),
            "USD",
            "EUR",
        ))
        .unwrap_err();
        assert_eq!(err.violations()[0].message, NOT_A_NUMBER);
    }

    #[test]
    fn test_collects_all_violations() {
        let err = ConversionRequest::from_params(&ConvertParams::default()).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["amount", "from", "to"]);
    }

    #[test]
    fn test_bad_currency_shape() {
        let err =
            ConversionRequest::from_params(&params(Some(AmountInput::Number(1.0)), "US", "EURO"))
                .unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.violations().iter().all(|v| v.message == NOT_A_CURRENCY));
    }

    #[test]
    fn test_result_serializes_source_lowercase() {
        let result = ConversionResult {
            amount: 1.0,
            from: "EUR".into(),
            to: "USD".into(),
            rate: 1.1,
            converted: 1.1,
            formatted: "$1.10".into(),
            source: RateSource::Cache,
            timestamp: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "cache");
        assert_eq!(json["converted"], 1.1);
    }
}
