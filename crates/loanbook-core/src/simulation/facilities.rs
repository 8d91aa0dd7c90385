use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::seeded_rng;
use crate::facility::{FacilityRecord, IndustrySector};
use crate::types::*;
use crate::{LoanBookError, LoanBookResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityGenInput {
    #[serde(default = "default_count")]
    pub count: u32,
    /// Optional seed for reproducibility.
    pub seed: Option<u64>,
    #[serde(default = "default_min_amount")]
    pub min_amount_usd: u64,
    /// Exclusive upper bound.
    #[serde(default = "default_max_amount")]
    pub max_amount_usd: u64,
    #[serde(default = "default_first_maturity")]
    pub first_maturity: NaiveDate,
    #[serde(default = "default_last_maturity")]
    pub last_maturity: NaiveDate,
}

fn default_count() -> u32 {
    1_000
}

fn default_min_amount() -> u64 {
    5_000_000
}

fn default_max_amount() -> u64 {
    250_000_000
}

fn default_first_maturity() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
}

fn default_last_maturity() -> NaiveDate {
    NaiveDate::from_ymd_opt(2032, 12, 31).unwrap_or_default()
}

impl Default for FacilityGenInput {
    fn default() -> Self {
        Self {
            count: default_count(),
            seed: None,
            min_amount_usd: default_min_amount(),
            max_amount_usd: default_max_amount(),
            first_maturity: default_first_maturity(),
            last_maturity: default_last_maturity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityGenOutput {
    pub facilities: Vec<FacilityRecord>,
    pub total_exposure_usd: u64,
}

/// Margin bounds in basis points: 1.00% to 6.50%.
const MARGIN_BP_RANGE: (i64, i64) = (100, 650);

/// Generate a synthetic facility book with ids `CORP_00001`, `CORP_00002`, ...
pub fn generate_facilities(
    input: &FacilityGenInput,
) -> LoanBookResult<ComputationOutput<FacilityGenOutput>> {
    let start = Instant::now();

    if input.count == 0 {
        return Err(LoanBookError::InvalidInput {
            field: "count".into(),
            reason: "Must generate at least one facility".into(),
        });
    }
    if input.count > 99_999 {
        return Err(LoanBookError::InvalidInput {
            field: "count".into(),
            reason: "Client ids are five digits; at most 99,999 facilities".into(),
        });
    }
    if input.min_amount_usd == 0 || input.min_amount_usd >= input.max_amount_usd {
        return Err(LoanBookError::InvalidInput {
            field: "min_amount_usd".into(),
            reason: "Need 0 < min_amount_usd < max_amount_usd".into(),
        });
    }
    let span_days = (input.last_maturity - input.first_maturity).num_days();
    if span_days <= 0 {
        return Err(LoanBookError::InvalidInput {
            field: "last_maturity".into(),
            reason: "Maturity window must be at least one day".into(),
        });
    }

    let mut rng = seeded_rng(input.seed);
    let mut facilities = Vec::with_capacity(input.count as usize);
    let mut total_exposure_usd = 0u64;

    for i in 1..=input.count {
        let facility_amount_usd = rng.gen_range(input.min_amount_usd..input.max_amount_usd);
        let margin_bp = rng.gen_range(MARGIN_BP_RANGE.0..=MARGIN_BP_RANGE.1);
        let offset = rng.gen_range(0..span_days);
        let industry_sector = *IndustrySector::ALL
            .choose(&mut rng)
            .unwrap_or(&IndustrySector::Manufacturing);

        total_exposure_usd += facility_amount_usd;
        facilities.push(FacilityRecord {
            client_id: format!("CORP_{i:05}"),
            industry_sector,
            facility_amount_usd,
            interest_rate_margin_pct: Decimal::new(margin_bp, 2),
            maturity_date: input.first_maturity + Duration::days(offset),
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Synthetic facility book (uniform amounts, margins, maturities and sectors)",
        &serde_json::json!({
            "count": input.count,
            "seed": input.seed,
            "amount_range_usd": [input.min_amount_usd, input.max_amount_usd],
            "margin_range_pct": ["1.00", "6.50"],
            "maturity_window": [input.first_maturity, input.last_maturity],
        }),
        Vec::new(),
        elapsed,
        FacilityGenOutput {
            facilities,
            total_exposure_usd,
        },
    ))
}
