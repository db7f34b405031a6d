//! Isolation verification command

use super::CommandResult;
use clap::Args;
use isoguard_engine::{
    render_verification_summary, verify_isolation, write_verification_report,
    HttpSystemUnderTest, VerifyConfig,
};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// TOML run configuration
    #[arg(long)]
    pub config: PathBuf,

    /// Override the monitored cache root
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Override the system-under-test URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the wait after each invocation, in milliseconds
    #[arg(long)]
    pub grace_ms: Option<u64>,

    /// Override the report directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

pub fn execute(args: VerifyArgs) -> CommandResult {
    let mut config = VerifyConfig::load(&args.config)?;
    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(grace_ms) = args.grace_ms {
        config.grace_period_ms = grace_ms;
    }
    if let Some(report_dir) = args.report_dir {
        config.report_dir = Some(report_dir);
    }

    let plan = config.to_plan()?;
    let fingerprinter = config.fingerprinter()?;
    let sut = HttpSystemUnderTest::new(config.endpoint.clone())?;

    let outcome = verify_isolation(&plan, &sut, fingerprinter.as_ref());

    print!("{}", render_verification_summary(&outcome));
    // The verdict decides the exit code even when the report cannot be saved.
    if let Some(dir) = &config.report_dir {
        match write_verification_report(dir, &outcome) {
            Ok(paths) => println!("Report: {}", paths.json.display()),
            Err(err) => eprintln!("Warning: report not written: {}", err),
        }
    }
    Ok(outcome.exit_code())
}
