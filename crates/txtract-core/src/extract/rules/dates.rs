//! Date parsing for transaction text.

use chrono::NaiveDate;
use regex::Captures;
use tracing::debug;

use super::patterns::{DATE_ISO_FULL, DATE_NAMED_FULL, DATE_NUMERIC_FULL};
use super::FieldParser;
use crate::error::ExtractionError;
use crate::models::config::{DateOrder, ExtractionConfig};
use crate::models::record::{DateFormat, ParsedDate};

/// Multi-format date parser.
///
/// Formats are tried in a fixed order: `D Mon YYYY`, `YYYY-MM-DD`, then the
/// numeric day/month forms, which are told apart by component value.
#[derive(Debug, Clone)]
pub struct DateParser {
    min_year: i32,
    max_year: i32,
    order: DateOrder,
}

impl DateParser {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_year: config.min_year,
            max_year: config.max_year,
            order: config.ambiguous_date_order,
        }
    }

    /// Restrict accepted years to `min_year..=max_year`.
    pub fn with_year_window(mut self, min_year: i32, max_year: i32) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    pub fn with_order(mut self, order: DateOrder) -> Self {
        self.order = order;
        self
    }

    fn build(
        &self,
        year: i32,
        month: u32,
        day: u32,
        format: DateFormat,
        ambiguous: bool,
    ) -> Option<ParsedDate> {
        if year < self.min_year || year > self.max_year {
            debug!("Year {} outside plausible window {}..={}", year, self.min_year, self.max_year);
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, day).map(|date| ParsedDate {
            date,
            format,
            ambiguous,
        })
    }

    fn parse_named(&self, caps: &Captures) -> Option<ParsedDate> {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        self.build(year, month, day, DateFormat::DayMonthName, false)
    }

    fn parse_iso(&self, caps: &Captures) -> Option<ParsedDate> {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        self.build(year, month, day, DateFormat::Iso, false)
    }

    fn parse_numeric(&self, caps: &Captures) -> Option<ParsedDate> {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;

        let day_first = (first, second, DateFormat::DayMonthYear);
        let month_first = (second, first, DateFormat::MonthDayYear);

        let ((day, month, format), ambiguous) = if first > 12 {
            (day_first, false)
        } else if second > 12 {
            (month_first, false)
        } else {
            let preferred = match self.order {
                DateOrder::DayFirst => day_first,
                DateOrder::MonthFirst => month_first,
            };
            (preferred, true)
        };

        self.build(year, month, day, format, ambiguous)
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser for DateParser {
    type Output = ParsedDate;

    fn parse(&self, text: &str) -> Result<ParsedDate, ExtractionError> {
        let trimmed = text.trim();

        let parsed = if let Some(caps) = DATE_NAMED_FULL.captures(trimmed) {
            self.parse_named(&caps)
        } else if let Some(caps) = DATE_ISO_FULL.captures(trimmed) {
            self.parse_iso(&caps)
        } else if let Some(caps) = DATE_NUMERIC_FULL.captures(trimmed) {
            self.parse_numeric(&caps)
        } else {
            None
        };

        parsed.ok_or_else(|| ExtractionError::UnparseableDate(trimmed.to_string()))
    }
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june",
        "july", "august", "september", "october", "november", "december",
    ];

    let name = name.to_lowercase();
    if name == "sept" {
        return Some(9);
    }

    MONTHS
        .iter()
        .position(|full| name.len() >= 3 && full.starts_with(name.as_str()))
        .and_then(|i| u32::try_from(i + 1).ok())
}
