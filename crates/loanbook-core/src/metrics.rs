use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::facility::FacilityRecord;
use crate::reconciliation::CleanedFinancials;
use crate::types::*;
use crate::{LoanBookError, LoanBookResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Internal three-bucket credit rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InternalRating {
    A,
    B,
    C,
}

impl std::fmt::Display for InternalRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for InternalRating {
    type Err = LoanBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            other => Err(LoanBookError::InvalidInput {
                field: "internal_rating".into(),
                reason: format!("Unknown rating '{other}'; expected A, B or C."),
            }),
        }
    }
}

/// Credit metrics for one client with usable financials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub client_id: String,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub revenue: Option<Money>,
    #[serde(with = "rust_decimal::serde::str")]
    pub ebitda: Money,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_debt: Money,
    #[serde(with = "rust_decimal::serde::str")]
    pub estimated_interest_rate: Rate,
    #[serde(with = "rust_decimal::serde::str")]
    pub annual_interest_expense: Money,
    /// Interest coverage, 2dp.
    #[serde(with = "rust_decimal::serde::str")]
    pub icr: Multiple,
    /// Total debt / EBITDA, 2dp.
    #[serde(with = "rust_decimal::serde::str")]
    pub leverage_ratio: Multiple,
    pub internal_rating: InternalRating,
    #[serde(with = "rust_decimal::serde::str")]
    pub pd_percent: Rate,
    /// Expected credit loss, 2dp.
    #[serde(with = "rust_decimal::serde::str")]
    pub ecl_provision: Money,
}

/// Inputs for scoring a single client outside the batch pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleClientInput {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub revenue: Option<Money>,
    pub ebitda: Money,
    pub total_debt: Money,
    pub facility_amount_usd: u64,
    pub interest_rate_margin_pct: Rate,
}

fn default_client_id() -> String {
    "ADHOC".to_string()
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Interest coverage: EBITDA over interest expense, zero when there is no
/// positive expense to cover. `None` if the quotient overflows.
pub fn interest_coverage(ebitda: Money, annual_interest_expense: Money) -> Option<Multiple> {
    if annual_interest_expense > Decimal::ZERO {
        ebitda.checked_div(annual_interest_expense)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Leverage: total debt over EBITDA, or `sentinel` when EBITDA is not positive.
/// `None` if the quotient overflows.
pub fn leverage(total_debt: Money, ebitda: Money, sentinel: Multiple) -> Option<Multiple> {
    if ebitda > Decimal::ZERO {
        total_debt.checked_div(ebitda)
    } else {
        Some(sentinel)
    }
}

/// Walk the rating decision table top to bottom; the first band whose
/// leverage and coverage tests both pass decides the rating.
pub fn assign_rating(leverage_ratio: Multiple, icr: Multiple, config: &RiskConfig) -> InternalRating {
    config
        .rating_bands
        .iter()
        .find(|band| leverage_ratio < band.leverage_below && icr > band.icr_above)
        .map(|band| band.rating)
        .unwrap_or(config.fallback_rating)
}

/// Compute the full metric record for one reconciled client.
///
/// Ratios drive the rating at full precision; `icr`, `leverage_ratio` and
/// `ecl_provision` are rounded to 2dp only in the emitted record.
pub fn compute_metrics(
    financials: &CleanedFinancials,
    facility: &FacilityRecord,
    config: &RiskConfig,
) -> LoanBookResult<MetricRecord> {
    if financials.client_id != facility.client_id {
        return Err(LoanBookError::InvalidInput {
            field: "client_id".into(),
            reason: format!(
                "Financials for '{}' cannot be scored against facility '{}'.",
                financials.client_id, facility.client_id
            ),
        });
    }

    let overflow = |metric: &str| LoanBookError::MetricOverflow {
        client_id: financials.client_id.clone(),
        metric: metric.to_string(),
    };

    let estimated_interest_rate = config
        .base_interest_rate
        .checked_add(pct_to_rate(facility.interest_rate_margin_pct))
        .ok_or_else(|| overflow("estimated_interest_rate"))?;
    let annual_interest_expense = financials
        .total_debt
        .checked_mul(estimated_interest_rate)
        .ok_or_else(|| overflow("annual_interest_expense"))?;

    let icr = interest_coverage(financials.ebitda, annual_interest_expense)
        .ok_or_else(|| overflow("icr"))?;
    let leverage_ratio = leverage(
        financials.total_debt,
        financials.ebitda,
        config.leverage_sentinel,
    )
    .ok_or_else(|| overflow("leverage_ratio"))?;

    let internal_rating = assign_rating(leverage_ratio, icr, config);
    let pd_percent = config.pd_table.pd_for(internal_rating);
    let ecl_provision = Decimal::from(facility.facility_amount_usd)
        .checked_mul(pd_percent)
        .and_then(|v| v.checked_mul(config.lgd))
        .ok_or_else(|| overflow("ecl_provision"))?;

    Ok(MetricRecord {
        client_id: financials.client_id.clone(),
        revenue: financials.revenue,
        ebitda: financials.ebitda,
        total_debt: financials.total_debt,
        estimated_interest_rate,
        annual_interest_expense,
        icr: round_report(icr),
        leverage_ratio: round_report(leverage_ratio),
        internal_rating,
        pd_percent,
        ecl_provision: round_report(ecl_provision),
    })
}

/// Score a single client supplied directly rather than through the stores.
pub fn score_client(input: &SingleClientInput, config: &RiskConfig) -> LoanBookResult<MetricRecord> {
    if input.total_debt < Decimal::ZERO {
        return Err(LoanBookError::InvalidInput {
            field: "total_debt".into(),
            reason: "Total debt cannot be negative.".into(),
        });
    }
    let facility = FacilityRecord {
        client_id: input.client_id.clone(),
        industry_sector: crate::facility::IndustrySector::Financials,
        facility_amount_usd: input.facility_amount_usd,
        interest_rate_margin_pct: input.interest_rate_margin_pct,
        maturity_date: chrono::NaiveDate::MIN,
    };
    crate::facility::validate_facilities(std::slice::from_ref(&facility))?;
    let financials = CleanedFinancials {
        client_id: input.client_id.clone(),
        fiscal_year: None,
        revenue: input.revenue,
        ebitda: input.ebitda,
        total_debt: input.total_debt,
    };
    compute_metrics(&financials, &facility, config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
