//! Record assembly and confidence scoring.

use rust_decimal::Decimal;

use crate::models::record::{ParsedAmount, ParsedDate, Penalty, TransactionRecord};

/// Parsed values for each field kind; any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFields {
    pub date: Option<ParsedDate>,
    pub description: Option<String>,
    pub amount: Option<ParsedAmount>,
    /// Source text of the amount span, kept for diagnostics.
    pub amount_text: Option<String>,
    pub balance: Option<ParsedAmount>,
}

/// Fields after the mandatory-field check.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteFields {
    pub date: ParsedDate,
    pub description: String,
    pub amount: ParsedAmount,
    pub balance: Option<Decimal>,
}

/// Penalties that apply to a set of fields, in a fixed order.
pub fn penalties_for(fields: &CompleteFields) -> Vec<Penalty> {
    let mut penalties = Vec::new();
    if !fields.amount.sign.is_explicit() {
        penalties.push(Penalty::InferredSign);
    }
    if fields.balance.is_none() {
        penalties.push(Penalty::MissingBalance);
    }
    if fields.date.ambiguous {
        penalties.push(Penalty::AmbiguousDate);
    }
    penalties
}

/// Additive score: 1.0 minus each penalty, floored at 0.0.
pub fn confidence(penalties: &[Penalty]) -> f64 {
    let deducted: u32 = penalties.iter().map(Penalty::hundredths).sum();
    f64::from(100u32.saturating_sub(deducted)) / 100.0
}

/// Build the candidate record. Performs no validation beyond scoring.
pub fn assemble(fields: CompleteFields) -> TransactionRecord {
    let penalties = penalties_for(&fields);
    let confidence = confidence(&penalties);

    TransactionRecord {
        date: fields.date,
        description: fields.description,
        amount: fields.amount,
        balance_after: fields.balance,
        confidence,
        penalties,
    }
}
