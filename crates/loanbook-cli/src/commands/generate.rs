use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use loanbook_core::simulation::{
    generate_facilities, generate_submissions, FacilityGenInput, SubmissionGenInput,
};
use loanbook_core::PortfolioConfig;

use super::envelope;
use crate::store;

/// Arguments for generating the synthetic facility book
#[derive(Args)]
pub struct GenerateFacilitiesArgs {
    /// Number of facilities to book
    #[arg(long, default_value_t = 1000)]
    pub count: u32,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Facility store to write
    #[arg(long, default_value = "facilities.csv")]
    pub out: PathBuf,
}

/// Arguments for generating messy client financial submissions
#[derive(Args)]
pub struct GenerateFinancialsArgs {
    /// Facility store to read client ids from
    #[arg(long, default_value = "facilities.csv")]
    pub facilities: PathBuf,

    /// Submission store directory to write
    #[arg(long, default_value = "client_financials")]
    pub dir: PathBuf,

    /// Share of clients (from the front of the book) that submit
    #[arg(long, default_value = "0.8")]
    pub submission_rate: Decimal,

    /// Probability a debt figure is written as "USD <n>"
    #[arg(long, default_value_t = 0.05)]
    pub dirty_debt_probability: f64,

    /// Probability EBITDA is left blank
    #[arg(long, default_value_t = 0.02)]
    pub missing_ebitda_probability: f64,

    /// Fiscal year stamped on every submission
    #[arg(long, default_value_t = 2025)]
    pub fiscal_year: i32,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GenerateFinancialsArgs {
    pub(crate) fn gen_input(&self) -> SubmissionGenInput {
        SubmissionGenInput {
            submission_rate: self.submission_rate,
            dirty_debt_probability: self.dirty_debt_probability,
            missing_ebitda_probability: self.missing_ebitda_probability,
            fiscal_year: self.fiscal_year,
            seed: self.seed,
        }
    }
}

pub fn run_generate_facilities(
    args: GenerateFacilitiesArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    info!("Initializing core banking simulation...");
    let input = FacilityGenInput {
        count: args.count,
        seed: args.seed,
        ..FacilityGenInput::default()
    };
    let output = generate_facilities(&input)?;
    store::facility::write_facilities(&args.out, &output.result.facilities)?;
    info!(
        "Generated {} loan records and saved to '{}'",
        output.result.facilities.len(),
        args.out.display()
    );

    envelope(
        &output,
        json!({
            "facilities_written": output.result.facilities.len(),
            "total_exposure_usd": output.result.total_exposure_usd,
            "facility_store": args.out.display().to_string(),
        }),
    )
}

pub fn run_generate_financials(
    args: GenerateFinancialsArgs,
    config: &PortfolioConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    info!("Initializing financial data simulation...");
    let book = store::facility::read_facilities(&args.facilities)?;
    let ids: Vec<String> = book.into_iter().map(|f| f.client_id).collect();

    let output = generate_submissions(&ids, &args.gen_input(), &config.aliases)?;
    let r = &output.result;
    info!("Generating messy files for {} clients...", r.submissions.len());
    store::submission::write_submissions(&args.dir, &r.submissions)?;
    info!(
        "Created {} submission files in '{}'",
        r.submissions.len(),
        args.dir.display()
    );

    envelope(
        &output,
        json!({
            "submissions_written": r.submissions.len(),
            "non_submitting": r.non_submitting.len(),
            "dirty_debt_count": r.dirty_debt_count,
            "missing_ebitda_count": r.missing_ebitda_count,
            "submission_store": args.dir.display().to_string(),
        }),
    )
}
