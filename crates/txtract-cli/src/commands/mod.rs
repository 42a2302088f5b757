//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use txtract_core::models::config::{OutputFormat as ConfiguredFormat, TxtractConfig};
use txtract_core::models::record::format_plain;
use txtract_core::wire::TransactionPayload;
use txtract_core::TransactionRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Labeled text, one field per line
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

impl From<ConfiguredFormat> for OutputFormat {
    fn from(format: ConfiguredFormat) -> Self {
        match format {
            ConfiguredFormat::Json => OutputFormat::Json,
            ConfiguredFormat::Csv => OutputFormat::Csv,
            ConfiguredFormat::Text => OutputFormat::Text,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("txtract")
        .join("config.json")
}

/// Load the file given with `--config`, else the default file if present.
pub fn load_config(path: Option<&str>) -> anyhow::Result<TxtractConfig> {
    if let Some(path) = path {
        return TxtractConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        return Ok(TxtractConfig::from_file(&default_path)?);
    }

    Ok(TxtractConfig::default())
}

/// Render records in `format`. JSON output is an object for a single record
/// and an array otherwise.
pub fn render(records: &[&TransactionRecord], format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let payloads: Vec<TransactionPayload> = records.iter().map(|r| TransactionPayload::from(*r)).collect();
            let value = match payloads.as_slice() {
                [single] => serde_json::to_value(single)?,
                _ => serde_json::to_value(&payloads)?,
            };
            Ok(if pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            })
        }
        OutputFormat::Csv => format_records_csv(records),
        OutputFormat::Text => Ok(records
            .iter()
            .map(|r| r.to_labeled_text())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn format_records_csv(records: &[&TransactionRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "description", "amount", "balance_after", "confidence"])?;

    for record in records {
        let payload = TransactionPayload::from(*record);
        wtr.write_record([
            payload.date.as_str(),
            payload.description.as_str(),
            payload.amount.as_str(),
            &record.balance_after.map(format_plain).unwrap_or_default(),
            &format!("{:.2}", record.confidence),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
