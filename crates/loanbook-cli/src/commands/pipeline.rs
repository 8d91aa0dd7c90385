use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;

use loanbook_core::PortfolioConfig;

use super::generate::{self, GenerateFacilitiesArgs, GenerateFinancialsArgs};
use super::process::{self, ProcessArgs};
use super::report::{self, ReportArgs};

/// Arguments for running every stage end to end
#[derive(Args)]
pub struct RunArgs {
    /// Directory all stores and the report are written to
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Number of facilities to book
    #[arg(long, default_value_t = 1000)]
    pub count: u32,

    /// Share of clients that submit financials
    #[arg(long, default_value = "0.8")]
    pub submission_rate: Decimal,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_pipeline(
    args: RunArgs,
    config: &PortfolioConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let facilities = args.workdir.join("facilities.csv");
    let dir = args.workdir.join("client_financials");
    let metrics = args.workdir.join("metrics.csv");
    let out = args.workdir.join("final_dashboard_data.csv");

    let generated = generate::run_generate_facilities(GenerateFacilitiesArgs {
        count: args.count,
        seed: args.seed,
        out: facilities.clone(),
    })?;

    let submitted = generate::run_generate_financials(
        GenerateFinancialsArgs {
            facilities: facilities.clone(),
            dir: dir.clone(),
            submission_rate: args.submission_rate,
            dirty_debt_probability: 0.05,
            missing_ebitda_probability: 0.02,
            fiscal_year: 2025,
            // Derive a distinct stream so submissions are not correlated with the book.
            seed: args.seed.map(|s| s.wrapping_add(1)),
        },
        config,
    )?;

    let processed = process::run_process(
        ProcessArgs {
            facilities: facilities.clone(),
            dir,
            out: metrics.clone(),
        },
        config,
    )?;

    let reported = report::run_report(
        ReportArgs {
            facilities,
            metrics,
            out,
        },
        config,
    )?;

    let mut result = json!({
        "generate_facilities": generated["result"],
        "generate_financials": submitted["result"],
        "process": processed["result"],
    });
    if let (Value::Object(map), Value::Object(rep)) = (&mut result, &reported["result"]) {
        for (k, v) in rep {
            map.insert(k.clone(), v.clone());
        }
    }

    let mut warnings = Vec::new();
    for stage in [&generated, &submitted, &processed, &reported] {
        if let Some(Value::Array(w)) = stage.get("warnings") {
            warnings.extend(w.iter().cloned());
        }
    }

    Ok(json!({
        "result": result,
        "methodology": "Generate book, generate submissions, reconcile, report",
        "warnings": warnings,
        "metadata": reported["metadata"],
    }))
}
