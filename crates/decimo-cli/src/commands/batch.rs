//! Batch command - scan many ticket files.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use decimo_core::scan::NumberScanner;

use super::scan::InputReader;
use super::{extension, is_image, Context};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Write a summary CSV to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Add every detected number to the book under this name
    #[arg(long, value_name = "NAME")]
    add: Option<String>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of scanning a single file.
struct ScanOutcome {
    path: PathBuf,
    number: Option<String>,
    candidates: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ScanOutcome {
    fn status(&self) -> &'static str {
        match (&self.error, &self.number) {
            (Some(_), _) => "error",
            (None, Some(_)) => "found",
            (None, None) => "not_found",
        }
    }
}

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image(p) || matches!(extension(p).as_str(), "txt" | "json"))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to scan",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut reader = InputReader::new(&ctx.config, args.model_dir.clone());
    let scanner = NumberScanner::from_config(&ctx.config.scan);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let scanned = reader
            .read(&path)
            .map(|(text, tokens)| scanner.scan(&text, &tokens));
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match scanned {
            Ok(report) => results.push(ScanOutcome {
                path,
                number: report.number,
                candidates: report.candidates.len(),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to scan {}: {}", path.display(), error_msg);
                    results.push(ScanOutcome {
                        path,
                        number: None,
                        candidates: 0,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to scan {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Scanning failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(name) = &args.add {
        add_found(&results, name, ctx)?;
    }

    match &args.output {
        Some(path) => {
            let wtr = csv::Writer::from_path(path)?;
            write_summary(wtr, &results)?;
            eprintln!(
                "{} Summary written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => {
            for result in &results {
                println!(
                    "{}\t{}",
                    result.path.display(),
                    result.number.as_deref().unwrap_or("-")
                );
            }
        }
    }

    let found = results.iter().filter(|r| r.number.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Scanned {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} found, {} not found, {} failed",
        style(found).green(),
        style(results.len() - found - failed.len()).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Add detected numbers to the book, skipping ones already there.
fn add_found(results: &[ScanOutcome], name: &str, ctx: &Context) -> anyhow::Result<()> {
    let mut book = ctx.load_book()?;
    let mut added = 0;

    for number in results.iter().filter_map(|r| r.number.as_deref()) {
        match book.add(number, name) {
            Ok(_) => added += 1,
            Err(e) => warn!("Skipped {}: {}", number, e),
        }
    }

    ctx.save_book(&book)?;
    eprintln!("{} Added {} tickets for {}", style("✓").green(), added, name);
    Ok(())
}

fn write_summary<W: io::Write>(mut wtr: csv::Writer<W>, results: &[ScanOutcome]) -> anyhow::Result<()> {
    wtr.write_record([
        "filename",
        "status",
        "number",
        "candidates",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        wtr.write_record([
            file_name(&result.path),
            result.status(),
            result.number.as_deref().unwrap_or(""),
            &result.candidates.to_string(),
            &result.processing_time_ms.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}
