//! Metrics sink port.

use std::fmt;

/// A single field value in a metrics point.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "\"{}\"", v.replace('"', "\\\"")),
        }
    }
}

/// Best-effort metrics capability.
///
/// `record` has no error contract: implementations swallow every failure and
/// must not block the caller.
pub trait MetricsSink: Send + Sync + 'static {
    fn record(&self, measurement: &str, fields: &[(&str, FieldValue)], tags: &[(&str, &str)]);
}

/// Sink used when no metrics backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record(&self, _measurement: &str, _fields: &[(&str, FieldValue)], _tags: &[(&str, &str)]) {}
}
