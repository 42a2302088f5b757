//! Error types for the txtract-core library.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::record::{FieldKind, TransactionRecord};

/// Main error type for the txtract library.
#[derive(Error, Debug)]
pub enum TxtractError {
    /// Transaction extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// What a `MissingField` diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// The input was empty; nothing was extracted at all.
    All,
    /// A single mandatory field.
    Field(FieldKind),
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::All => f.write_str("all fields"),
            Missing::Field(kind) => write!(f, "{}", kind),
        }
    }
}

/// Errors produced while extracting a single transaction record.
///
/// Every variant is a returned value; the engine never panics on bad input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// A mandatory field is missing (or the whole input is empty).
    #[error("missing required field: {0}")]
    MissingField(Missing),

    /// Several candidates were found for a field and none takes precedence.
    #[error("ambiguous {field}: {} candidates ({})", .candidates.len(), .candidates.join(", "))]
    AmbiguousField {
        field: FieldKind,
        candidates: Vec<String>,
    },

    /// The date span did not match any accepted format.
    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),

    /// The amount or balance span is not a valid numeric literal.
    #[error("unparseable amount: {0:?}")]
    UnparseableAmount(String),

    /// `prior_balance + amount` does not reproduce the stated balance.
    ///
    /// Advisory: the record itself parsed cleanly and is attached so the
    /// caller can accept it with a warning.
    #[error("balance mismatch: expected {expected}, statement says {actual} (delta {delta})")]
    BalanceMismatch {
        expected: Decimal,
        actual: Decimal,
        delta: Decimal,
        record: Box<TransactionRecord>,
    },

    /// The assembled record scored below the acceptance threshold.
    #[error("low confidence: {score:.2} is below threshold {threshold:.2}")]
    LowConfidence { score: f64, threshold: f64 },
}

impl ExtractionError {
    /// Stable tag used on the wire (`errorKind`).
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::MissingField(_) => "missingField",
            ExtractionError::AmbiguousField { .. } => "ambiguousField",
            ExtractionError::UnparseableDate(_) => "unparseableDate",
            ExtractionError::UnparseableAmount(_) => "unparseableAmount",
            ExtractionError::BalanceMismatch { .. } => "balanceMismatch",
            ExtractionError::LowConfidence { .. } => "lowConfidence",
        }
    }

    /// Whether a caller may reasonably accept the attached record anyway.
    pub fn is_advisory(&self) -> bool {
        matches!(self, ExtractionError::BalanceMismatch { .. })
    }

    /// The parsed record carried by advisory diagnostics.
    pub fn record(&self) -> Option<&TransactionRecord> {
        match self {
            ExtractionError::BalanceMismatch { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// Result type for the txtract library.
pub type Result<T> = std::result::Result<T, TxtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ExtractionError::MissingField(Missing::Field(FieldKind::Amount)).kind(),
            "missingField"
        );
        assert_eq!(
            ExtractionError::UnparseableAmount("abc".into()).kind(),
            "unparseableAmount"
        );
        assert_eq!(
            ExtractionError::LowConfidence { score: 0.4, threshold: 0.5 }.kind(),
            "lowConfidence"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ExtractionError::MissingField(Missing::Field(FieldKind::Amount));
        assert_eq!(err.to_string(), "missing required field: amount");

        let err = ExtractionError::MissingField(Missing::All);
        assert_eq!(err.to_string(), "missing required field: all fields");

        let err = ExtractionError::AmbiguousField {
            field: FieldKind::Date,
            candidates: vec!["01/02/2025".into(), "03/02/2025".into()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous date: 2 candidates (01/02/2025, 03/02/2025)"
        );
    }

    #[test]
    fn test_only_balance_mismatch_is_advisory() {
        assert!(!ExtractionError::UnparseableDate("x".into()).is_advisory());
        assert!(ExtractionError::UnparseableDate("x".into()).record().is_none());
    }
}
