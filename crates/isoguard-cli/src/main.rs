//! isoguard CLI
//!
//! Command-line interface for cache-isolation verification and keyed
//! reconciliation

use clap::{Parser, Subcommand, ValueEnum};
use isoguard_core::logging_facility::{init, Profile};

mod commands;

/// Exit code for errors that prevented a verdict.
const EXIT_ERROR: i32 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "isoguard")]
#[command(about = "isoguard - cache isolation checks and dataset reconciliation", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr; filter with RUST_LOG)
    #[arg(long, global = true, value_enum, default_value = "human")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Capture and compare directory snapshots
    Snapshot(commands::snapshot::SnapshotArgs),
    /// Compare two keyed datasets
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Run a full isolation check against the system under test
    Verify(commands::verify::VerifyArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Snapshot(args) => commands::snapshot::execute(args),
        Commands::Reconcile(args) => commands::reconcile::execute(args),
        Commands::Verify(args) => commands::verify::execute(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    }
}
