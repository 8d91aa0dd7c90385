use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loanbook_core::metrics::{score_client, SingleClientInput};
use loanbook_core::report::classify_status;
use loanbook_core::PortfolioConfig;

use crate::input;

/// Arguments for scoring a single client
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Client identifier
    #[arg(long, default_value = "ADHOC")]
    pub client_id: String,

    /// Revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// EBITDA
    #[arg(long)]
    pub ebitda: Option<Decimal>,

    /// Total debt
    #[arg(long)]
    pub total_debt: Option<Decimal>,

    /// Facility amount in USD
    #[arg(long, alias = "amount")]
    pub facility_amount_usd: Option<u64>,

    /// Margin over base rate, in percent
    #[arg(long, alias = "margin")]
    pub interest_rate_margin_pct: Option<Decimal>,
}

pub fn run_rate(args: RateArgs, config: &PortfolioConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let client: SingleClientInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        SingleClientInput {
            client_id: args.client_id,
            revenue: args.revenue,
            ebitda: args
                .ebitda
                .ok_or("--ebitda is required (or provide --input)")?,
            total_debt: args
                .total_debt
                .ok_or("--total-debt is required (or provide --input)")?,
            facility_amount_usd: args
                .facility_amount_usd
                .ok_or("--facility-amount-usd is required (or provide --input)")?,
            interest_rate_margin_pct: args
                .interest_rate_margin_pct
                .ok_or("--interest-rate-margin-pct is required (or provide --input)")?,
        }
    };

    let metric = score_client(&client, &config.risk)?;
    let status = classify_status(Some(&metric), client.facility_amount_usd, &config.report);

    let mut result = serde_json::to_value(&metric)?;
    if let Value::Object(map) = &mut result {
        map.insert("dashboard_status".into(), json!(status));
    }

    Ok(json!({
        "result": result,
        "methodology": "Rule-based internal rating with PD x LGD expected credit loss",
        "warnings": [],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args() -> RateArgs {
        RateArgs {
            input: None,
            client_id: "CORP_00001".into(),
            revenue: Some(dec!(100)),
            ebitda: Some(dec!(10)),
            total_debt: Some(dec!(35)),
            facility_amount_usd: Some(200_000_000),
            interest_rate_margin_pct: Some(dec!(0.5)),
        }
    }

    #[test]
    fn test_input_file_scores_client() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(
            &path,
            r#"{"ebitda": "10", "total_debt": "50", "facility_amount_usd": 200000000,
                "interest_rate_margin_pct": "0.5"}"#,
        )
        .unwrap();
        let value = run_rate(
            RateArgs {
                input: Some(path.to_string_lossy().into_owned()),
                ..args()
            },
            &PortfolioConfig::default(),
        )
        .unwrap();
        assert_eq!(value["result"]["client_id"], "ADHOC");
        assert_eq!(value["result"]["internal_rating"], "C");
        assert_eq!(value["result"]["dashboard_status"], "Critical Watchlist");
    }

    #[test]
    fn test_missing_input_file_is_error() {
        let result = run_rate(
            RateArgs {
                input: Some("/no/such/client.json".into()),
                ..args()
            },
            &PortfolioConfig::default(),
        );
        assert!(result.is_err());
    }
}
