//! facelog - face attendance from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{
    EnrollCommand, LogsCommand, RecognizeCommand, SetActiveCommand, SummaryCommand,
    WorkHoursCommand,
};
use config::Config;

/// facelog - face attendance from the command line.
///
/// Matches face embeddings against the enrolled gallery, records every
/// attempt in the attendance ledger and reports work hours.
///
/// Configuration is read from ~/.facelog/config.yaml.
#[derive(Parser)]
#[command(name = "facelog")]
#[command(about = "Face attendance: recognize, enroll, report work hours")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.facelog/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match an embedding and record the attempt
    Recognize(RecognizeCommand),
    /// Enroll a new identity
    Enroll(EnrollCommand),
    /// Exclude an identity from matching
    Deactivate(SetActiveCommand),
    /// Include an identity in matching again
    Activate(SetActiveCommand),
    /// Show the most recent ledger entries
    Logs(LogsCommand),
    /// Work sessions for one date
    WorkHours(WorkHoursCommand),
    /// Per-identity totals over a date range
    Summary(SummaryCommand),
    /// Gallery and ledger counters
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::load(cli.config.as_deref())?;
    let recognizer = cfg.open_recognizer()?;

    match &cli.command {
        Commands::Recognize(cmd) => cmd.run(&recognizer, cli.json),
        Commands::Enroll(cmd) => cmd.run(&recognizer, cli.json),
        Commands::Deactivate(cmd) => cmd.run(&recognizer, false, cli.json),
        Commands::Activate(cmd) => cmd.run(&recognizer, true, cli.json),
        Commands::Logs(cmd) => cmd.run(&recognizer, cli.json),
        Commands::WorkHours(cmd) => cmd.run(&recognizer, cli.json),
        Commands::Summary(cmd) => cmd.run(&recognizer, cli.json),
        Commands::Stats => commands::stats(&recognizer, cli.json),
    }
}
