//! Ticket book commands - add, remove and list tickets.

use clap::Args;
use console::style;

use decimo_core::results::format_prize_amount;
use decimo_core::Ticket;

use super::Context;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Five-digit ticket number
    number: String,

    /// Ticket holder
    #[arg(short, long)]
    name: String,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Ticket id, as shown by `decimo list`
    id: String,
}

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only show winning tickets
    #[arg(short, long)]
    winners: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ListFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ListFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Table
    Text,
}

pub async fn add(args: AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut book = ctx.load_book()?;
    let ticket = book.add(&args.number, &args.name)?.clone();
    ctx.save_book(&book)?;

    println!(
        "{} Added {} for {} (id {})",
        style("✓").green(),
        ticket.number,
        ticket.name,
        ticket.id
    );
    if let Some(prize) = ticket.prize {
        println!(
            "{} This ticket won {} €",
            style("★").yellow(),
            format_prize_amount(prize)
        );
    }

    Ok(())
}

pub async fn remove(args: RemoveArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut book = ctx.load_book()?;
    let ticket = book.remove(&args.id)?;
    ctx.save_book(&book)?;

    println!(
        "{} Removed {} ({})",
        style("✓").green(),
        ticket.number,
        ticket.name
    );

    Ok(())
}

pub async fn list(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let book = ctx.load_book()?;
    let tickets: Vec<&Ticket> = if args.winners {
        book.winners().collect()
    } else {
        book.tickets().iter().collect()
    };

    match args.format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&tickets)?),
        ListFormat::Csv => print!("{}", format_tickets_csv(&tickets)?),
        ListFormat::Text => {
            if tickets.is_empty() {
                println!("{} No tickets", style("ℹ").blue());
                return Ok(());
            }
            println!("{}", format_tickets_text(&tickets));
            if book.results().is_some() {
                println!();
                println!(
                    "Total won: {} €",
                    style(format_prize_amount(book.total_prize())).green()
                );
            }
        }
    }

    Ok(())
}

fn format_tickets_csv(tickets: &[&Ticket]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["id", "number", "name", "added_at", "prize"])?;
    for ticket in tickets {
        wtr.write_record([
            &ticket.id,
            &ticket.number,
            &ticket.name,
            &ticket.added_at.to_rfc3339(),
            &ticket.prize.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_tickets_text(tickets: &[&Ticket]) -> String {
    let name_width = tickets
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut lines = vec![format!(
        "{:<13}  {:<6} {:<width$}  {:<10}  {}",
        "ID",
        "NUMBER",
        "NAME",
        "ADDED",
        "PRIZE",
        width = name_width
    )];

    for ticket in tickets {
        let prize = match ticket.prize {
            Some(p) => format!("{} €", format_prize_amount(p)),
            None => "-".to_string(),
        };
        lines.push(format!(
            "{:<13}  {:<6} {:<width$}  {:<10}  {}",
            ticket.id,
            ticket.number,
            ticket.name,
            ticket.added_at.format("%Y-%m-%d"),
            prize,
            width = name_width
        ));
    }

    lines.join("\n")
}
