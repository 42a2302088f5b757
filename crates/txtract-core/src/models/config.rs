//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TxtractError};

/// Main configuration for txtract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxtractConfig {
    /// Extraction engine configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration (used by the CLI).
    pub output: OutputConfig,
}

/// Which component comes first when a numeric date could be read either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `03/04/2025` is 3 April.
    #[default]
    DayFirst,
    /// `03/04/2025` is 4 March.
    MonthFirst,
}

/// Extraction engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Records scoring below this are rejected as low confidence (0.0 - 1.0).
    pub min_confidence: f64,

    /// Largest accepted difference between computed and stated balance.
    pub balance_tolerance: Decimal,

    /// Earliest plausible transaction year (inclusive).
    pub min_year: i32,

    /// Latest plausible transaction year (inclusive).
    pub max_year: i32,

    /// Reading of numeric dates where both components are <= 12.
    pub ambiguous_date_order: DateOrder,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            balance_tolerance: Decimal::new(1, 2),
            min_year: 1970,
            max_year: 2100,
            ambiguous_date_order: DateOrder::DayFirst,
        }
    }
}

impl ExtractionConfig {
    /// Set the confidence threshold.
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Set the balance continuity tolerance.
    pub fn with_balance_tolerance(mut self, tolerance: Decimal) -> Self {
        self.balance_tolerance = tolerance;
        self
    }

    /// Set the plausible year window.
    pub fn with_year_window(mut self, min_year: i32, max_year: i32) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    /// Set the default order for ambiguous numeric dates.
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.ambiguous_date_order = order;
        self
    }

    /// Check the settings are internally consistent.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(TxtractError::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.balance_tolerance.is_sign_negative() {
            return Err(TxtractError::Config(format!(
                "balance_tolerance must not be negative, got {}",
                self.balance_tolerance
            )));
        }
        if self.min_year > self.max_year {
            return Err(TxtractError::Config(format!(
                "year window is inverted: {} > {}",
                self.min_year, self.max_year
            )));
        }
        Ok(())
    }
}

/// Output format for rendered records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl TxtractConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
