use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use loanbook_core::report::build_report;
use loanbook_core::PortfolioConfig;

use super::envelope;
use crate::store;

/// Arguments for building the executive dashboard dataset
#[derive(Args)]
pub struct ReportArgs {
    /// Facility store
    #[arg(long, default_value = "facilities.csv")]
    pub facilities: PathBuf,

    /// Metrics store
    #[arg(long, default_value = "metrics.csv")]
    pub metrics: PathBuf,

    /// Report artifact to write
    #[arg(long, default_value = "final_dashboard_data.csv")]
    pub out: PathBuf,
}

pub fn run_report(
    args: ReportArgs,
    config: &PortfolioConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    info!("Generating final executive dashboard dataset...");
    let book = store::facility::read_facilities(&args.facilities)?;
    let metrics = store::metrics::read_metrics(&args.metrics)?;

    let output = build_report(&book, &metrics, &config.report)?;
    let r = &output.result;
    store::report::write_report(&args.out, &r.rows)?;

    info!("Dashboard data saved to '{}' ({} rows)", args.out.display(), r.total_rows);
    for s in &r.status_breakdown {
        info!("  {:<36} {}", s.status.label(), s.count);
    }

    envelope(
        &output,
        json!({
            "total_rows": r.total_rows,
            "status_breakdown": r.status_breakdown,
            "rating_distribution": r.rating_distribution,
            "total_exposure_usd": r.total_exposure_usd,
            "total_ecl_provision": r.total_ecl_provision,
            "report": args.out.display().to_string(),
        }),
    )
}
