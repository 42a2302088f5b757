//! Description normalization.

use super::FieldParser;
use crate::error::{ExtractionError, Missing};
use crate::models::record::FieldKind;

/// Trims and collapses whitespace; merchant text is passed through verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionNormalizer;

impl FieldParser for DescriptionNormalizer {
    type Output = String;

    fn parse(&self, text: &str) -> Result<String, ExtractionError> {
        normalize_description(text)
    }
}

pub fn normalize_description(text: &str) -> Result<String, ExtractionError> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(ExtractionError::MissingField(Missing::Field(FieldKind::Description)));
    }
    Ok(normalized)
}
