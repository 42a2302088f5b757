//! Batch command for statement files holding many transactions.
//!
//! Records within a file are separated by blank lines. With `--chain` the
//! stated balance of each record becomes the prior balance of the next, so a
//! gap or a misread amount shows up as a balance mismatch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use txtract_core::models::record::{format_plain, format_signed};
use txtract_core::{
    CachedExtractor, ExtractionError, Extractor, TransactionExtractor, TransactionRecord,
};

use super::{load_config, render, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Prior balance for the first record of each file
    #[arg(long)]
    opening_balance: Option<Decimal>,

    /// Carry each record's balance forward as the next record's prior balance
    #[arg(long)]
    chain: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Reuse results for repeated record text
    #[arg(long)]
    cache: bool,
}

/// Outcome of one record.
enum Outcome {
    Extracted(TransactionRecord),
    /// Parsed, but the balance does not follow from the prior one.
    Mismatch(TransactionRecord, ExtractionError),
    Failed(ExtractionError),
}

impl Outcome {
    fn status(&self) -> &'static str {
        match self {
            Outcome::Extracted(_) => "ok",
            Outcome::Mismatch(..) => "mismatch",
            Outcome::Failed(_) => "error",
        }
    }

    fn record(&self) -> Option<&TransactionRecord> {
        match self {
            Outcome::Extracted(record) | Outcome::Mismatch(record, _) => Some(record),
            Outcome::Failed(_) => None,
        }
    }

    fn error(&self) -> Option<&ExtractionError> {
        match self {
            Outcome::Extracted(_) => None,
            Outcome::Mismatch(_, err) | Outcome::Failed(err) => Some(err),
        }
    }
}

struct RecordResult {
    path: PathBuf,
    /// 1-based position within the file.
    index: usize,
    outcome: Outcome,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor: Box<dyn TransactionExtractor> = if args.cache {
        Box::new(CachedExtractor::new(Extractor::new(config.extraction.clone())))
    } else {
        Box::new(Extractor::new(config.extraction.clone()))
    };
    let format = args.format.unwrap_or_else(|| config.output.format.into());

    let mut results = Vec::new();

    for path in &files {
        let text = fs::read_to_string(path)?;
        let file_results = process_file(path, &text, extractor.as_ref(), &args);

        if !args.continue_on_error {
            if let Some(failed) = file_results.iter().find(|r| matches!(r.outcome, Outcome::Failed(_))) {
                let err = failed.outcome.error().map(|e| e.to_string()).unwrap_or_default();
                error!("Failed to process {} record {}: {}", path.display(), failed.index, err);
                pb.abandon();
                anyhow::bail!("Processing failed: {} record {}: {}", path.display(), failed.index, err);
            }
        }

        if let Some(output_dir) = &args.output_dir {
            let records: Vec<&TransactionRecord> = file_results.iter().filter_map(|r| r.outcome.record()).collect();
            if !records.is_empty() {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("statement");
                let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));
                fs::write(&output_path, render(&records, format, config.output.pretty)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }

        results.extend(file_results);
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |status: &str| results.iter().filter(|r| r.outcome.status() == status).count();
    let (extracted, mismatched, failed) = (count("ok"), count("mismatch"), count("error"));

    println!();
    println!(
        "{} Processed {} records from {} files in {:?}",
        style("✓").green(),
        results.len(),
        files.len(),
        start.elapsed()
    );
    println!(
        "   {} extracted, {} balance mismatches, {} failed",
        style(extracted).green(),
        style(mismatched).yellow(),
        style(failed).red()
    );

    let problems: Vec<&RecordResult> = results.iter().filter(|r| r.outcome.error().is_some()).collect();
    if !problems.is_empty() {
        println!();
        println!("{}", style("Problems:").red());
        for result in problems {
            println!(
                "  - {} #{}: {}",
                result.path.display(),
                result.index,
                result.outcome.error().map(|e| e.to_string()).unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn process_file(
    path: &Path,
    text: &str,
    extractor: &dyn TransactionExtractor,
    args: &BatchArgs,
) -> Vec<RecordResult> {
    let mut prior = args.opening_balance;
    let mut results = Vec::new();

    for (i, record_text) in split_records(text).into_iter().enumerate() {
        let outcome = match extractor.extract(&record_text, prior) {
            Ok(record) => Outcome::Extracted(record),
            Err(err) => match err.record().cloned() {
                Some(record) => {
                    warn!("{} record {}: {}", path.display(), i + 1, err);
                    Outcome::Mismatch(record, err)
                }
                None => Outcome::Failed(err),
            },
        };

        prior = if args.chain {
            // The stated balance is authoritative even after a mismatch
            outcome.record().and_then(|r| r.balance_after)
        } else {
            None
        };

        results.push(RecordResult {
            path: path.to_path_buf(),
            index: i + 1,
            outcome,
        });

        if !args.continue_on_error && matches!(results.last().map(|r| &r.outcome), Some(Outcome::Failed(_))) {
            break;
        }
    }

    debug!("{}: {} records", path.display(), results.len());
    results
}

/// Split on blank lines; whitespace-only chunks are dropped.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
fn split_records(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut records = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        records.push(current.join("\n"));
    }

    records
}

fn write_summary(path: &Path, results: &[RecordResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "record",
        "status",
        "date",
        "description",
        "amount",
        "balance_after",
        "confidence",
        "error_kind",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let index = result.index.to_string();
        let error_kind = result.outcome.error().map(ExtractionError::kind).unwrap_or("");
        let error = result.outcome.error().map(|e| e.to_string()).unwrap_or_default();

        if let Some(record) = result.outcome.record() {
            wtr.write_record([
                filename,
                &index,
                result.outcome.status(),
                &record.date.date.format("%Y-%m-%d").to_string(),
                &record.description,
                &format_signed(record.amount.value),
                &record.balance_after.map(format_plain).unwrap_or_default(),
                &format!("{:.2}", record.confidence),
                error_kind,
                &error,
            ])?;
        } else {
            wtr.write_record([
                filename,
                &index,
                result.outcome.status(),
                "",
                "",
                "",
                "",
                "",
                error_kind,
                &error,
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
