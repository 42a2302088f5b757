//! Transaction record data model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Semantic kind of a located field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    Description,
    Amount,
    Balance,
}

impl FieldKind {
    /// Mandatory kinds, in the order they are checked.
    pub const MANDATORY: [FieldKind; 3] = [FieldKind::Date, FieldKind::Description, FieldKind::Amount];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Date => "date",
            FieldKind::Description => "description",
            FieldKind::Amount => "amount",
            FieldKind::Balance => "balance",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction implied by the text around a value (a `Debit:` label, a `Cr` suffix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Debit,
    Credit,
}

/// How a span was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanOrigin {
    /// From a `Label: value` line; `direction` is set for debit/credit labels.
    Labeled { direction: Option<Direction> },
    /// Inferred from the shape of unlabeled text.
    Inferred,
}

/// A located substring of the source text tagged with its field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub kind: FieldKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub origin: SpanOrigin,
}

impl FieldSpan {
    pub fn new(kind: FieldKind, start: usize, end: usize, origin: SpanOrigin) -> Self {
        Self { kind, start, end, origin }
    }

    /// The spanned text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn overlaps(&self, other: &FieldSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn is_labeled(&self) -> bool {
        matches!(self.origin, SpanOrigin::Labeled { .. })
    }
}

/// Date layout a [`ParsedDate`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `11 Dec 2025`
    DayMonthName,
    /// `2025-12-11`
    Iso,
    /// `11/12/2025`
    DayMonthYear,
    /// `12/11/2025`
    MonthDayYear,
}

/// A calendar date together with how it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub format: DateFormat,
    /// Day and month could both have been either component.
    pub ambiguous: bool,
}

/// Provenance of an amount's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignSource {
    /// A literal `-` or `+`.
    Explicit,
    /// A `Dr`/`Cr`/`debit`/`credit` marker or a debit/credit label.
    Marker,
    /// Accounting parentheses, `(420.00)`.
    Parenthesized,
    /// No marker at all; assumed positive.
    Inferred,
}

impl SignSource {
    pub fn is_explicit(&self) -> bool {
        !matches!(self, SignSource::Inferred)
    }
}

/// A signed decimal value plus how its sign was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAmount {
    pub value: Decimal,
    pub sign: SignSource,
}

impl ParsedAmount {
    pub fn new(value: Decimal, sign: SignSource) -> Self {
        Self { value, sign }
    }
}

/// Fixed confidence deductions applied by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    InferredSign,
    MissingBalance,
    AmbiguousDate,
}

impl Penalty {
    /// Deduction in hundredths of a confidence point.
    pub fn hundredths(&self) -> u32 {
        match self {
            Penalty::InferredSign => 30,
            Penalty::MissingBalance => 10,
            Penalty::AmbiguousDate => 15,
        }
    }

    pub fn value(&self) -> f64 {
        f64::from(self.hundredths()) / 100.0
    }
}

/// A validated, normalized transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: ParsedDate,
    /// Trimmed, whitespace-collapsed narrative. Never empty.
    pub description: String,
    /// Signed amount. Never zero.
    pub amount: ParsedAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<Decimal>,
    /// Score in `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub penalties: Vec<Penalty>,
}

impl TransactionRecord {
    /// Render in the canonical labeled form accepted by the extractor.
    ///
    /// Dates are ISO and amounts carry an explicit sign, so re-extracting the
    /// output never scores lower than the record itself.
    pub fn to_labeled_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Date: {}\n", self.date.date.format("%Y-%m-%d")));
        out.push_str(&format!("Description: {}\n", self.description));
        out.push_str(&format!("Amount: {}\n", format_signed(self.amount.value)));
        if let Some(balance) = self.balance_after {
            out.push_str(&format!("Balance after transaction: {}\n", format_plain(balance)));
        }
        out
    }
}

/// Format with at least two decimal places and no sign for positive values.
pub fn format_plain(value: Decimal) -> String {
    let mut value = value.normalize();
    if value.scale() < 2 {
        value.rescale(2);
    }
    value.to_string()
}

/// Format with at least two decimal places and an explicit leading sign.
pub fn format_signed(value: Decimal) -> String {
    let plain = format_plain(value);
    if value.is_sign_negative() && !value.is_zero() {
        plain
    } else {
        format!("+{}", plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> TransactionRecord {
        TransactionRecord {
            date: ParsedDate {
                date: NaiveDate::from_ymd_opt(2025, 12, 11).unwrap(),
                format: DateFormat::DayMonthName,
                ambiguous: false,
            },
            description: "STARBUCKS COFFEE MUMBAI".to_string(),
            amount: ParsedAmount::new(dec("-420.00"), SignSource::Explicit),
            balance_after: Some(dec("18420.5")),
            confidence: 1.0,
            penalties: Vec::new(),
        }
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(dec("-420.00")), "-420.00");
        assert_eq!(format_signed(dec("420")), "+420.00");
        assert_eq!(format_signed(dec("0.125")), "+0.125");
        assert_eq!(format_plain(dec("18420.5")), "18420.50");
        assert_eq!(format_plain(dec("-3.10")), "-3.10");
    }

    #[test]
    fn test_labeled_text() {
        assert_eq!(
            sample().to_labeled_text(),
            "Date: 2025-12-11\n\
             Description: STARBUCKS COFFEE MUMBAI\n\
             Amount: -420.00\n\
             Balance after transaction: 18420.50\n"
        );
    }

    #[test]
    fn test_span_overlap() {
        let a = FieldSpan::new(FieldKind::Date, 0, 10, SpanOrigin::Inferred);
        let b = FieldSpan::new(FieldKind::Amount, 10, 15, SpanOrigin::Inferred);
        let c = FieldSpan::new(FieldKind::Amount, 9, 12, SpanOrigin::Inferred);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_penalty_values() {
        assert_eq!(Penalty::InferredSign.value(), 0.3);
        assert_eq!(Penalty::MissingBalance.value(), 0.1);
        assert_eq!(Penalty::AmbiguousDate.value(), 0.15);
    }
}
