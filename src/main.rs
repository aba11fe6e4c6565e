//! finsheet CLI - extracts financial template workbooks to JSON

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use finsheet::batch;
use finsheet::config::{ExtractOptions, DEFAULT_TOP_N, DEFAULT_WEIGHTING_COLUMN};
use finsheet::Extraction;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Number of ranked products shown per file.
const PREVIEW_SIZE: usize = 3;

#[derive(Parser)]
#[command(name = "finsheet")]
#[command(
    author,
    version,
    about = "Extract setup fields and top products from financial template workbooks"
)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "batch"])))]
struct Cli {
    /// Single workbook to extract (xlsx, xlsm)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory whose workbooks are all extracted
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Header of the weighting column in the product table
    #[arg(long, default_value = DEFAULT_WEIGHTING_COLUMN)]
    weighting_column: String,

    /// Number of top products to keep
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Extract and report without writing JSON files
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let options = ExtractOptions {
        weighting_column: cli.weighting_column,
        top_n: cli.top,
        dry_run: cli.dry_run,
        ..ExtractOptions::default()
    };

    let outcome = match (cli.file, cli.batch) {
        (Some(file), _) => extract_one(&file, &options),
        (None, Some(directory)) => extract_directory(&directory, &options),
        (None, None) => unreachable!("clap requires one input"),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn extract_one(file: &Path, options: &ExtractOptions) -> Result<bool> {
    let extraction = finsheet::extract_file(file, options)
        .with_context(|| format!("Failed to extract '{}'", file.display()))?;
    print_extraction(&extraction);
    Ok(true)
}

fn extract_directory(directory: &Path, options: &ExtractOptions) -> Result<bool> {
    let summary = batch::run(directory, options)
        .with_context(|| format!("Failed to scan '{}'", directory.display()))?;
    for extraction in &summary.extractions {
        print_extraction(extraction);
    }
    for (file, error) in &summary.failures {
        println!("FAILED {}: {}", file.display(), error);
    }
    println!();
    println!(
        "Processed {} files: {} succeeded, {} failed",
        summary.total(),
        summary.extractions.len(),
        summary.failures.len()
    );
    Ok(summary.is_success())
}

fn print_extraction(extraction: &Extraction) {
    let result = &extraction.result;
    println!("{}", result.source_file);
    println!(
        "  {}: {} fields, {} subtables",
        result.setup.sheet_name, result.setup.field_count, result.setup.subtable_count
    );
    println!(
        "  {}: {} products",
        result.cost_of_sales.sheet_name, result.cost_of_sales.product_count
    );
    for (rank, entry) in result
        .cost_of_sales
        .top_products
        .by_weighting
        .iter()
        .take(PREVIEW_SIZE)
        .enumerate()
    {
        println!("    {}. {} ({})", rank + 1, entry.product, entry.weighting);
    }
    if let Some(info) = &result.info {
        println!("  {}: {} metrics", info.sheet_name, info.metrics.len());
    }
    if let Some(financials) = &result.financials {
        println!("  {}: {} categories", financials.sheet_name, financials.categories.len());
    }
    match &extraction.output {
        Some(output) => println!("  -> {}", output.display()),
        None => println!("  (dry run, nothing written)"),
    }
}
