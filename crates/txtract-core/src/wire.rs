//! JSON request and response shapes for transports.
//!
//! ```json
//! {"text": "Date: 11 Dec 2025\n...", "priorBalance": "18840.50"}
//! ```
//!
//! A success carries the record with the amount rendered as an explicitly
//! signed string; a failure carries `errorKind` and a kind-specific `detail`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ExtractionError, Missing};
use crate::extract::{Result, TransactionExtractor};
use crate::models::record::{format_plain, format_signed, TransactionRecord};

/// Incoming extraction request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub text: Option<String>,
    /// Balance before the transaction, as a JSON string or number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_balance: Option<Decimal>,
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            prior_balance: None,
        }
    }

    pub fn with_prior_balance(mut self, balance: Decimal) -> Self {
        self.prior_balance = Some(balance);
        self
    }
}

/// Serialized transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
    /// Signed, at least two decimals: `-420.00`, `+1500.00`.
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<String>,
    pub confidence: f64,
}

impl From<&TransactionRecord> for TransactionPayload {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            date: record.date.date.format("%Y-%m-%d").to_string(),
            description: record.description.clone(),
            amount: format_signed(record.amount.value),
            balance_after: record.balance_after.map(format_plain),
            confidence: record.confidence,
        }
    }
}

/// Serialized diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailurePayload {
    pub error_kind: String,
    pub message: String,
    pub detail: Value,
}

impl From<&ExtractionError> for FailurePayload {
    fn from(err: &ExtractionError) -> Self {
        let detail = match err {
            ExtractionError::MissingField(Missing::All) => json!({ "field": "all" }),
            ExtractionError::MissingField(Missing::Field(kind)) => json!({ "field": kind.as_str() }),
            ExtractionError::AmbiguousField { field, candidates } => {
                json!({ "field": field.as_str(), "candidates": candidates })
            }
            ExtractionError::UnparseableDate(text) | ExtractionError::UnparseableAmount(text) => {
                json!({ "text": text })
            }
            ExtractionError::BalanceMismatch { expected, actual, delta, record } => json!({
                "expected": format_plain(*expected),
                "actual": format_plain(*actual),
                "delta": format_plain(*delta),
                "record": TransactionPayload::from(&**record),
            }),
            ExtractionError::LowConfidence { score, threshold } => {
                json!({ "score": score, "threshold": threshold })
            }
        };

        Self {
            error_kind: err.kind().to_string(),
            message: err.to_string(),
            detail,
        }
    }
}

/// Response body: either the record or the diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResponse {
    Success(TransactionPayload),
    Failure(FailurePayload),
}

impl ExtractionResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResponse::Success(_))
    }
}

impl From<&Result<TransactionRecord>> for ExtractionResponse {
    fn from(result: &Result<TransactionRecord>) -> Self {
        match result {
            Ok(record) => ExtractionResponse::Success(record.into()),
            Err(err) => ExtractionResponse::Failure(err.into()),
        }
    }
}

/// Run one request through `extractor`. A missing `text` is treated as empty.
pub fn handle_request<E>(extractor: &E, request: &ExtractionRequest) -> ExtractionResponse
where
    E: TransactionExtractor + ?Sized,
{
    let text = request.text.as_deref().unwrap_or_default();
    ExtractionResponse::from(&extractor.extract(text, request.prior_balance))
}
