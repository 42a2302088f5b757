//! Extract command - pull one transaction out of a text file or stdin.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use txtract_core::wire::FailurePayload;
use txtract_core::{Extractor, TransactionExtractor};

use super::{load_config, render, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file, or `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Balance before this transaction, checked against the stated balance
    #[arg(short, long)]
    prior_balance: Option<Decimal>,

    /// Output format (default from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show the confidence score and any penalties
    #[arg(long)]
    show_confidence: bool,

    /// Print the record on a balance mismatch instead of failing
    #[arg(long)]
    accept_mismatch: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("Extracting from {}", describe_input(&args.input));

    let extractor = Extractor::new(config.extraction.clone());
    let record = match extractor.extract(&text, args.prior_balance) {
        Ok(record) => record,
        Err(err) if args.accept_mismatch && err.is_advisory() => {
            warn!("Accepting record despite: {}", err);
            eprintln!("{} {}", style("⚠").yellow(), err);
            match err.record() {
                Some(record) => record.clone(),
                None => anyhow::bail!("Extraction failed: {}", err),
            }
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&FailurePayload::from(&err))?);
            anyhow::bail!("Extraction failed: {}", err);
        }
    };

    let format = args.format.unwrap_or_else(|| config.output.format.into());
    let output = render(&[&record], format, config.output.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.0}%",
            style("ℹ").blue(),
            record.confidence * 100.0
        );
        for penalty in &record.penalties {
            println!("   - {:?} (-{:.2})", penalty, penalty.value());
        }
    }

    debug!("Total extraction time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}

fn describe_input(input: &Path) -> String {
    if input.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        input.display().to_string()
    }
}
