//! Snapshot capture and diff commands

use super::CommandResult;
use clap::{Args, Subcommand};
use isoguard_core::diff::{compute_diff, render_human_summary};
use isoguard_core::fingerprint::fingerprinter_for;
use isoguard_core::snapshot::{capture, CaptureOptions};
use isoguard_store::{load_snapshot, save_snapshot};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Fingerprint every file under a directory
    Capture(CaptureArgs),
    /// Compare two saved snapshots
    Diff(DiffArgs),
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    pub root: PathBuf,

    /// Write the snapshot here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, default_value = "sha256")]
    pub algorithm: String,

    /// Fingerprinting threads (defaults to available parallelism)
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    pub before: PathBuf,
    pub after: PathBuf,

    /// Print the diff as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: SnapshotArgs) -> CommandResult {
    match args.command {
        SnapshotCommand::Capture(capture_args) => execute_capture(capture_args),
        SnapshotCommand::Diff(diff_args) => execute_diff(diff_args),
    }
}

fn execute_capture(args: CaptureArgs) -> CommandResult {
    let fingerprinter = fingerprinter_for(&args.algorithm)
        .ok_or_else(|| format!("Unknown algorithm '{}' (use sha256 or sha512)", args.algorithm))?;

    let mut options = CaptureOptions::default();
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("--workers must be at least 1".into());
        }
        options.workers = workers;
    }

    let snapshot = capture(&args.root, fingerprinter.as_ref(), &options)?;
    for path in snapshot.unreadable() {
        eprintln!("warning: unreadable, omitted: {}", path);
    }

    match args.out {
        Some(out) => {
            save_snapshot(&out, &snapshot)?;
            println!("Snapshot captured:");
            println!("  root: {}", snapshot.root());
            println!("  files: {}", snapshot.len());
            println!("  unreadable: {}", snapshot.unreadable().len());
            println!("  algorithm: {}", snapshot.algorithm());
            println!("  out: {}", out.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }
    Ok(0)
}

fn execute_diff(args: DiffArgs) -> CommandResult {
    let before = load_snapshot(&args.before)?;
    let after = load_snapshot(&args.after)?;
    let diff = compute_diff(&before, &after)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print!("{}", render_human_summary(&diff));
    }

    Ok(if diff.violates_isolation() { 1 } else { 0 })
}
