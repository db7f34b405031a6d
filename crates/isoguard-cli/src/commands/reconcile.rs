//! Keyed reconciliation command

use super::CommandResult;
use clap::{Args, ValueEnum};
use isoguard_core::dataset::{KeyedDataset, WeightedDataset};
use isoguard_core::reconcile::{
    reconcile, reconcile_weights, render_mismatch_log, render_weight_log,
};
use isoguard_store::{write_reconciliation_report, write_weight_report, LogSource, TableSource};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// One row per key, one column per member
    Csv,
    /// Space-delimited lines carrying key, weight and member fields
    Log,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    #[arg(long)]
    pub reference: PathBuf,

    #[arg(long)]
    pub candidate: PathBuf,

    #[arg(long, value_enum, default_value = "csv")]
    pub reference_format: SourceFormat,

    #[arg(long, value_enum, default_value = "log")]
    pub candidate_format: SourceFormat,

    /// Only log lines containing this token are read
    #[arg(long, default_value = "buying")]
    pub marker: String,

    /// Member names to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Compare per-member weights instead of membership
    #[arg(long)]
    pub weights: bool,

    /// Allowed absolute weight difference
    #[arg(long, default_value_t = 0.0, requires = "weights")]
    pub tolerance: f64,

    /// Write `<stem>.json` and `<stem>.diff.log` into this directory
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, default_value = "reconciliation")]
    pub stem: String,
}

impl ReconcileArgs {
    fn table_source(&self) -> TableSource {
        self.exclude
            .iter()
            .fold(TableSource::default(), |source, name| source.exclude(name.clone()))
    }

    fn log_source(&self) -> LogSource {
        self.exclude.iter().fold(
            LogSource::default().with_marker(self.marker.clone()),
            |source, name| source.exclude(name.clone()),
        )
    }

    fn load_keyed(
        &self,
        path: &Path,
        format: SourceFormat,
        label: &str,
    ) -> Result<KeyedDataset, Box<dyn std::error::Error>> {
        let dataset = match format {
            SourceFormat::Csv => self.table_source().load_keyed(path, label)?,
            SourceFormat::Log => self.log_source().load_keyed(path, label)?,
        };
        Ok(dataset)
    }

    fn load_weighted(
        &self,
        path: &Path,
        format: SourceFormat,
        label: &str,
    ) -> Result<WeightedDataset, Box<dyn std::error::Error>> {
        let dataset = match format {
            SourceFormat::Csv => self.table_source().load_weighted(path, label)?,
            SourceFormat::Log => self.log_source().load_weighted(path, label)?,
        };
        Ok(dataset)
    }
}

pub fn execute(args: ReconcileArgs) -> CommandResult {
    if args.weights {
        let reference = args.load_weighted(&args.reference, args.reference_format, "reference")?;
        let candidate = args.load_weighted(&args.candidate, args.candidate_format, "candidate")?;
        let report = reconcile_weights(&reference, &candidate, args.tolerance);

        print!("{}", render_weight_log(&report));
        if let Some(dir) = &args.out {
            write_weight_report(dir, &args.stem, &report)?;
        }
        return Ok(if report.mismatches.is_empty() { 0 } else { 1 });
    }

    let reference = args.load_keyed(&args.reference, args.reference_format, "reference")?;
    let candidate = args.load_keyed(&args.candidate, args.candidate_format, "candidate")?;
    let report = reconcile(&reference, &candidate);

    print!("{}", render_mismatch_log(&report));
    if let Some(dir) = &args.out {
        write_reconciliation_report(dir, &args.stem, &report)?;
    }
    Ok(if report.mismatch_count() == 0 { 0 } else { 1 })
}
