//! Rule-based field parsers for transaction text.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod labels;
pub mod patterns;

pub use amounts::{parse_amount, AmountParser};
pub use dates::DateParser;
pub use description::{normalize_description, DescriptionNormalizer};
pub use labels::lookup_label;

use crate::error::ExtractionError;

/// Trait for per-field parsers.
///
/// Parsers are handed only the text of one located span and never look at
/// the rest of the input.
pub trait FieldParser {
    /// The type of value this parser produces.
    type Output;

    /// Parse the field from the span text.
    fn parse(&self, text: &str) -> Result<Self::Output, ExtractionError>;
}
