//! Error types for the conversion service.

use std::fmt;

use exchange_rates::CalcError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Domain-level errors (malformed input values).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolation {
    #[schema(example = "amount")]
    pub field: String,
    #[schema(example = "This value should be either positive or zero.")]
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found while validating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self(violations)
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Failures talking to the upstream rate API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExternalApiError {
    #[error("rate API returned HTTP {0}")]
    Status(u16),

    #[error("rate API timed out")]
    Timeout,

    #[error("rate API request failed: {0}")]
    Transport(String),

    #[error("unexpected or malformed rate API payload")]
    MalformedPayload,
}

/// Rate acquisition errors (client and provider).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    ExternalApi(#[from] ExternalApiError),

    #[error("Missing rate for currency: {0}")]
    RateNotFound(String),
}

/// Errors surfaced by the conversion service.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error(transparent)]
    Calculation(#[from] CalcError),
}

impl ConversionError {
    /// Tag value for the error-count metric, `None` for caller mistakes.
    pub fn metric_kind(&self) -> Option<&'static str> {
        match self {
            ConversionError::Rate(RateError::ExternalApi(_))
            | ConversionError::Rate(RateError::RateNotFound(_)) => Some("external_api"),
            ConversionError::Calculation(CalcError::InvalidRates { .. }) => Some("unexpected"),
            ConversionError::Validation(_)
            | ConversionError::Rate(RateError::Domain(_))
            | ConversionError::Calculation(CalcError::InvalidAmount) => None,
        }
    }
}

/// Session store failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Unprocessable {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{message}: {details}")]
    BadGateway { message: String, details: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Validation(v) => AppError::Unprocessable {
                message: "Validation failed".into(),
                details: Some(violations_json(v.violations())),
            },
            ConversionError::Rate(RateError::Domain(DomainError::InvalidCurrencyCode(code))) => {
                AppError::Unprocessable {
                    message: "Validation failed".into(),
                    details: Some(violations_json(&[FieldViolation::new(
                        "currency",
                        format!("Invalid currency code: {code}"),
                    )])),
                }
            }
            ConversionError::Rate(e) => AppError::BadGateway {
                message: "External API error".into(),
                details: e.to_string(),
            },
            ConversionError::Calculation(e @ CalcError::InvalidAmount) => AppError::Unprocessable {
                message: "Conversion failed".into(),
                details: Some(serde_json::Value::String(e.to_string())),
            },
            ConversionError::Calculation(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Internal(err.to_string())
    }
}

fn violations_json(violations: &[FieldViolation]) -> serde_json::Value {
    serde_json::to_value(violations).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_fields() {
        let errs = ValidationErrors::new(vec![
            FieldViolation::new("amount", "bad"),
            FieldViolation::new("to", "worse"),
        ]);
        assert_eq!(errs.to_string(), "amount: bad; to: worse");
    }

    #[test]
    fn test_metric_kinds() {
        let upstream = ConversionError::from(RateError::ExternalApi(ExternalApiError::Timeout));
        assert_eq!(upstream.metric_kind(), Some("external_api"));

        let missing = ConversionError::from(RateError::RateNotFound("JPY".into()));
        assert_eq!(missing.metric_kind(), Some("external_api"));

        let rates = ConversionError::from(CalcError::InvalidRates {
            eur_to_source: 0.0,
            eur_to_target: 1.0,
        });
        assert_eq!(rates.metric_kind(), Some("unexpected"));

        let invalid = ConversionError::Validation(ValidationErrors::new(vec![]));
        assert_eq!(invalid.metric_kind(), None);
    }

    #[test]
    fn test_only_invalid_rates_count_as_unexpected() {
        let amount = ConversionError::from(CalcError::InvalidAmount);
        assert_eq!(amount.metric_kind(), None);

        let domain = ConversionError::from(RateError::Domain(DomainError::InvalidCurrencyCode(
            "EURO".into(),
        )));
        assert_eq!(domain.metric_kind(), None);

        let app: AppError = ConversionError::from(CalcError::InvalidAmount).into();
        assert!(!matches!(app, AppError::Internal(_)));
    }

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let app: AppError = ConversionError::from(RateError::ExternalApi(
            ExternalApiError::Status(503),
        ))
        .into();
        match app {
            AppError::BadGateway { message, details } => {
                assert_eq!(message, "External API error");
                assert_eq!(details, "rate API returned HTTP 503");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_missing_rate_maps_to_bad_gateway() {
        let app: AppError = ConversionError::from(RateError::RateNotFound("XYZ".into())).into();
        assert!(matches!(app, AppError::BadGateway { .. }));
    }

    #[test]
    fn test_invalid_amount_maps_to_unprocessable() {
        let app: AppError = ConversionError::from(CalcError::InvalidAmount).into();
        assert!(matches!(app, AppError::Unprocessable { .. }));
    }

    #[test]
    fn test_invalid_rates_is_internal() {
        let app: AppError = ConversionError::from(CalcError::InvalidRates {
            eur_to_source: -1.0,
            eur_to_target: 1.0,
        })
        .into();
        assert!(matches!(app, AppError::Internal(_)));
    }

    #[test]
    fn test_validation_details_are_structured() {
        let app: AppError = ConversionError::Validation(ValidationErrors::new(vec![
            FieldViolation::new("amount", "This value should not be blank."),
        ]))
        .into();
        match app {
            AppError::Unprocessable { details, .. } => {
                let details = details.unwrap();
                assert_eq!(details[0]["field"], "amount");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
