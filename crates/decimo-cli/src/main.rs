//! CLI application for lottery ticket scanning and prize checking.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, check, config, scan, tickets, Context};

/// Decimo - Read lottery ticket numbers and check them against prize lists
#[derive(Parser)]
#[command(name = "decimo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the ticket book
    #[arg(short, long, global = true)]
    book: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the ticket number in a single image or OCR dump
    Scan(scan::ScanArgs),

    /// Detect ticket numbers in many files
    Batch(batch::BatchArgs),

    /// Add a ticket to the book
    Add(tickets::AddArgs),

    /// Remove a ticket from the book
    Remove(tickets::RemoveArgs),

    /// List tickets in the book
    List(tickets::ListArgs),

    /// Check the book against a prize list
    Check(check::CheckArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Config commands must work even when the config file is broken
    let ctx = || Context::load(cli.config.as_deref(), cli.book.clone());

    match cli.command {
        Commands::Scan(args) => scan::run(args, &ctx()?).await,
        Commands::Batch(args) => batch::run(args, &ctx()?).await,
        Commands::Add(args) => tickets::add(args, &ctx()?).await,
        Commands::Remove(args) => tickets::remove(args, &ctx()?).await,
        Commands::List(args) => tickets::list(args, &ctx()?).await,
        Commands::Check(args) => check::run(args, &ctx()?).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}

