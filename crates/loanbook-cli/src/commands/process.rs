use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use loanbook_core::reconciliation::reconcile_submissions;
use loanbook_core::PortfolioConfig;

use super::envelope;
use crate::store;

/// Arguments for reconciling submissions and computing credit metrics
#[derive(Args)]
pub struct ProcessArgs {
    /// Facility store
    #[arg(long, default_value = "facilities.csv")]
    pub facilities: PathBuf,

    /// Submission store directory
    #[arg(long, default_value = "client_financials")]
    pub dir: PathBuf,

    /// Metrics store to write
    #[arg(long, default_value = "metrics.csv")]
    pub out: PathBuf,
}

pub fn run_process(
    args: ProcessArgs,
    config: &PortfolioConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    info!("Starting banking analytics pipeline...");
    let book = store::facility::read_facilities(&args.facilities)?;

    info!("Scanning folder '{}'...", args.dir.display());
    let submissions = store::submission::scan_submissions(&args.dir)?;
    let output = reconcile_submissions(&book, submissions, config)?;
    let r = &output.result;

    store::metrics::write_metrics(&args.out, &r.metrics)?;
    info!(
        processed = r.processed,
        errored = r.errored,
        "Metrics saved to '{}'",
        args.out.display()
    );
    info!(
        "Total portfolio ECL provision calculated: ${}",
        r.total_ecl_provision.round_dp(2)
    );

    envelope(
        &output,
        json!({
            "processed": r.processed,
            "errored": r.errored,
            "skipped_unknown_client": r.skipped_unknown_client,
            "error_breakdown": r.error_breakdown,
            "total_ecl_provision": r.total_ecl_provision.round_dp(2),
            "metrics_store": args.out.display().to_string(),
        }),
    )
}
