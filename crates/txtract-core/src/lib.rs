//! Core library for extracting bank transactions from free text.
//!
//! This crate provides:
//! - A field locator for labeled (`Amount: -420.00`) and narrative statement text
//! - Date, amount and description parsers for common bank formats
//! - Record assembly with an additive confidence score
//! - Balance continuity and confidence validation
//! - JSON request/response types for transports

pub mod error;
pub mod extract;
pub mod models;
pub mod wire;

pub use error::{ExtractionError, Missing, Result, TxtractError};
pub use extract::{extract, CachedExtractor, Extractor, TransactionExtractor};
pub use models::config::{DateOrder, ExtractionConfig, OutputConfig, OutputFormat, TxtractConfig};
pub use models::record::{
    Direction, FieldKind, FieldSpan, ParsedAmount, ParsedDate, Penalty, SignSource, TransactionRecord,
};
pub use wire::{handle_request, ExtractionRequest, ExtractionResponse};
