//! Check command - apply a prize list to the ticket book.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use decimo_core::pdf::{PdfExtractor, PdfProcessor};
use decimo_core::results::{format_prize_amount, parse_prize_list_above};

use super::{extension, Context};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Prize list (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Show the winners without saving the book
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: CheckArgs, ctx: &Context) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = match extension(&args.input).as_str() {
        "pdf" => {
            let mut extractor = PdfExtractor::new();
            extractor.load(&fs::read(&args.input)?)?;
            debug!("Results PDF has {} pages", extractor.page_count());
            extractor.extract_text()?
        }
        "txt" => fs::read_to_string(&args.input)?,
        ext => anyhow::bail!("Unsupported file format: {}", ext),
    };

    let table = parse_prize_list_above(&text, ctx.config.results.min_prize);
    if table.is_empty() {
        anyhow::bail!("No prizes found in {}", args.input.display());
    }
    info!("Parsed {} prizes from {}", table.len(), args.input.display());

    let mut book = ctx.load_book()?;
    let winners = book.apply_prizes(table);
    if !args.dry_run {
        ctx.save_book(&book)?;
    }

    if winners == 0 {
        println!(
            "{} None of your {} tickets won",
            style("ℹ").blue(),
            book.len()
        );
        return Ok(());
    }

    println!(
        "{} {} winning tickets out of {}",
        style("★").yellow(),
        winners,
        book.len()
    );
    for ticket in book.winners() {
        if let Some(prize) = ticket.prize {
            println!(
                "  {}  {:<20} {} €",
                style(&ticket.number).bold(),
                ticket.name,
                format_prize_amount(prize)
            );
        }
    }
    println!();
    println!(
        "Total won: {} €",
        style(format_prize_amount(book.total_prize())).green()
    );

    Ok(())
}
