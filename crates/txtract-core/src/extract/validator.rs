//! Structural and arithmetic checks on extracted records.

use rust_decimal::Decimal;
use tracing::debug;

use super::assembler::{CompleteFields, ParsedFields};
use crate::error::{ExtractionError, Missing};
use crate::models::config::ExtractionConfig;
use crate::models::record::{FieldKind, TransactionRecord};

/// Applies the mandatory-field, balance continuity and confidence checks.
#[derive(Debug, Clone)]
pub struct Validator {
    balance_tolerance: Decimal,
    min_confidence: f64,
}

impl Validator {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            balance_tolerance: config.balance_tolerance,
            min_confidence: config.min_confidence,
        }
    }

    /// Require date, description and amount (checked in that order) and a
    /// non-zero amount.
    pub fn require_mandatory(&self, fields: ParsedFields) -> Result<CompleteFields, ExtractionError> {
        let missing = |kind| ExtractionError::MissingField(Missing::Field(kind));

        let date = fields.date.ok_or_else(|| missing(FieldKind::Date))?;
        let description = fields.description.ok_or_else(|| missing(FieldKind::Description))?;
        let amount = fields.amount.ok_or_else(|| missing(FieldKind::Amount))?;

        if amount.value.is_zero() {
            return Err(ExtractionError::UnparseableAmount(
                fields.amount_text.unwrap_or_else(|| amount.value.to_string()),
            ));
        }

        Ok(CompleteFields {
            date,
            description,
            amount,
            balance: fields.balance.map(|b| b.value),
        })
    }

    /// Check balance continuity, then the confidence threshold.
    pub fn validate(
        &self,
        record: TransactionRecord,
        prior_balance: Option<Decimal>,
    ) -> Result<TransactionRecord, ExtractionError> {
        let record = self.check_balance(record, prior_balance)?;
        self.check_confidence(record)
    }

    /// `prior + amount` must match the stated balance within tolerance.
    ///
    /// Skipped unless both balances are known. The amount is never adjusted.
    /// A sum outside the `Decimal` range is reported as an unparseable amount.
    pub fn check_balance(
        &self,
        record: TransactionRecord,
        prior_balance: Option<Decimal>,
    ) -> Result<TransactionRecord, ExtractionError> {
        let (Some(prior), Some(actual)) = (prior_balance, record.balance_after) else {
            return Ok(record);
        };

        let overflow = || ExtractionError::UnparseableAmount(format!("{} + {}", prior, record.amount.value));
        let expected = prior.checked_add(record.amount.value).ok_or_else(overflow)?;
        let delta = expected.checked_sub(actual).ok_or_else(overflow)?;

        if delta.abs() > self.balance_tolerance {
            debug!("Balance mismatch: {} + {} != {}", prior, record.amount.value, actual);
            return Err(ExtractionError::BalanceMismatch {
                expected,
                actual,
                delta,
                record: Box::new(record),
            });
        }

        Ok(record)
    }

    pub fn check_confidence(&self, record: TransactionRecord) -> Result<TransactionRecord, ExtractionError> {
        if record.confidence < self.min_confidence {
            return Err(ExtractionError::LowConfidence {
                score: record.confidence,
                threshold: self.min_confidence,
            });
        }
        Ok(record)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::assembler::assemble;
    use crate::models::record::{DateFormat, ParsedAmount, ParsedDate, SignSource};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parsed() -> ParsedFields {
        ParsedFields {
            date: Some(ParsedDate {
                date: NaiveDate::from_ymd_opt(2025, 12, 11).unwrap(),
                format: DateFormat::DayMonthName,
                ambiguous: false,
            }),
            description: Some("STARBUCKS COFFEE MUMBAI".to_string()),
            amount: Some(ParsedAmount::new(dec("-420.00"), SignSource::Explicit)),
            amount_text: Some("-420.00".to_string()),
            balance: Some(ParsedAmount::new(dec("18420.50"), SignSource::Inferred)),
        }
    }

    fn record() -> TransactionRecord {
        assemble(Validator::default().require_mandatory(parsed()).unwrap())
    }

    #[test]
    fn test_mandatory_order() {
        let validator = Validator::default();

        let err = validator.require_mandatory(ParsedFields::default()).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField(Missing::Field(FieldKind::Date)));

        let fields = ParsedFields { description: None, amount: None, ..parsed() };
        let err = validator.require_mandatory(fields).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField(Missing::Field(FieldKind::Description)));

        let fields = ParsedFields { amount: None, ..parsed() };
        let err = validator.require_mandatory(fields).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField(Missing::Field(FieldKind::Amount)));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let fields = ParsedFields {
            amount: Some(ParsedAmount::new(dec("0.00"), SignSource::Explicit)),
            amount_text: Some("-0.00".to_string()),
            ..parsed()
        };
        assert_eq!(
            Validator::default().require_mandatory(fields).unwrap_err(),
            ExtractionError::UnparseableAmount("-0.00".to_string())
        );
    }

    #[test]
    fn test_balance_continuity() {
        let validator = Validator::default();
        assert!(validator.check_balance(record(), Some(dec("18840.50"))).is_ok());
        assert!(validator.check_balance(record(), None).is_ok());
    }

    #[test]
    fn test_balance_within_tolerance() {
        let validator = Validator::default();
        assert!(validator.check_balance(record(), Some(dec("18840.51"))).is_ok());
        assert!(validator.check_balance(record(), Some(dec("18840.49"))).is_ok());
        assert!(validator.check_balance(record(), Some(dec("18840.52"))).is_err());
    }

    #[test]
    fn test_balance_mismatch_reports_delta() {
        let err = Validator::default()
            .check_balance(record(), Some(dec("19000.00")))
            .unwrap_err();

        match err {
            ExtractionError::BalanceMismatch { expected, actual, delta, record: attached } => {
                assert_eq!(expected, dec("18580.00"));
                assert_eq!(actual, dec("18420.50"));
                assert_eq!(delta, dec("159.50"));
                // Amount is left exactly as parsed
                assert_eq!(attached.amount.value, dec("-420.00"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_balance_overflow_is_an_error() {
        let validator = Validator::default();

        let err = validator.check_balance(record(), Some(Decimal::MIN)).unwrap_err();
        assert_eq!(err.kind(), "unparseableAmount");

        let mut credit = record();
        credit.amount.value = dec("5.00");
        let err = validator.check_balance(credit, Some(Decimal::MAX)).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::UnparseableAmount(format!("{} + 5.00", Decimal::MAX))
        );
    }

    #[test]
    fn test_confidence_gate() {
        let validator = Validator::new(&ExtractionConfig::default().with_min_confidence(0.95));
        let mut low = record();
        low.confidence = 0.9;

        assert_eq!(
            validator.check_confidence(low).unwrap_err(),
            ExtractionError::LowConfidence { score: 0.9, threshold: 0.95 }
        );
        assert!(validator.check_confidence(record()).is_ok());
    }

    #[test]
    fn test_balance_checked_before_confidence() {
        let validator = Validator::new(&ExtractionConfig::default().with_min_confidence(1.0));
        let mut low = record();
        low.confidence = 0.2;

        let err = validator.validate(low, Some(dec("0.00"))).unwrap_err();
        assert_eq!(err.kind(), "balanceMismatch");
    }
}
