//! Transaction extraction pipeline.

pub mod assembler;
mod cache;
pub mod locator;
pub mod rules;
pub mod validator;

pub use cache::CachedExtractor;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{ExtractionError, Missing};
use crate::models::config::ExtractionConfig;
use crate::models::record::{FieldKind, FieldSpan, SpanOrigin, TransactionRecord};

use assembler::{assemble, ParsedFields};
use locator::locate;
use rules::{parse_amount, AmountParser, DateParser, DescriptionNormalizer, FieldParser};
use validator::Validator;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for transaction extractors.
pub trait TransactionExtractor {
    /// Extract one transaction from `text`, checking balance continuity
    /// against `prior_balance` when both balances are known.
    fn extract(&self, text: &str, prior_balance: Option<Decimal>) -> Result<TransactionRecord>;
}

/// Rule-based extractor. Holds no mutable state and is safe to share.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    dates: DateParser,
    validator: Validator,
}

impl Extractor {
    /// Create an extractor with the given settings.
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            dates: DateParser::from_config(&config),
            validator: Validator::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn parse_fields(&self, text: &str, spans: &[FieldSpan]) -> Result<ParsedFields> {
        let mut fields = ParsedFields::default();

        // Parse order decides which error is reported first
        for kind in [FieldKind::Date, FieldKind::Amount, FieldKind::Balance, FieldKind::Description] {
            let Some(span) = single_span(text, spans, kind)? else {
                continue;
            };
            let value = span.text(text);

            match kind {
                FieldKind::Date => fields.date = Some(self.dates.parse(value)?),
                FieldKind::Amount => {
                    let direction = match span.origin {
                        SpanOrigin::Labeled { direction } => direction,
                        SpanOrigin::Inferred => None,
                    };
                    fields.amount = Some(AmountParser::new().with_direction(direction).parse(value)?);
                    fields.amount_text = Some(value.trim().to_string());
                }
                FieldKind::Balance => fields.balance = Some(parse_amount(value)?),
                FieldKind::Description => fields.description = Some(DescriptionNormalizer.parse(value)?),
            }
        }

        Ok(fields)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl TransactionExtractor for Extractor {
    fn extract(&self, text: &str, prior_balance: Option<Decimal>) -> Result<TransactionRecord> {
        if text.trim().is_empty() {
            return Err(ExtractionError::MissingField(Missing::All));
        }

        info!("Extracting transaction from {} bytes of text", text.len());

        let spans = locate(text);
        let fields = self.parse_fields(text, &spans)?;
        let complete = self.validator.require_mandatory(fields)?;
        let record = assemble(complete);

        debug!(
            "Assembled {} {} with confidence {:.2}",
            record.date.date, record.amount.value, record.confidence
        );

        self.validator.validate(record, prior_balance)
    }
}

/// Extract with default settings.
pub fn extract(text: &str, prior_balance: Option<Decimal>) -> Result<TransactionRecord> {
    Extractor::default().extract(text, prior_balance)
}

/// The only span of `kind`, or `AmbiguousField` when there are several.
fn single_span(text: &str, spans: &[FieldSpan], kind: FieldKind) -> Result<Option<FieldSpan>> {
    let matching: Vec<&FieldSpan> = spans.iter().filter(|s| s.kind == kind).collect();

    match matching.as_slice() {
        [] => Ok(None),
        [span] => Ok(Some(**span)),
        many => Err(ExtractionError::AmbiguousField {
            field: kind,
            candidates: many.iter().map(|s| s.text(text).trim().to_string()).collect(),
        }),
    }
}
