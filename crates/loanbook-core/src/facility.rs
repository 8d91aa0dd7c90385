use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Rate;
use crate::{LoanBookError, LoanBookResult};

/// Industry classification carried on every facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndustrySector {
    Manufacturing,
    #[serde(rename = "Commercial Real Estate")]
    CommercialRealEstate,
    Technology,
    Healthcare,
    Retail,
    Energy,
    Financials,
    Aviation,
    Logistics,
    Telecommunications,
}

impl IndustrySector {
    pub const ALL: [IndustrySector; 10] = [
        Self::Manufacturing,
        Self::CommercialRealEstate,
        Self::Technology,
        Self::Healthcare,
        Self::Retail,
        Self::Energy,
        Self::Financials,
        Self::Aviation,
        Self::Logistics,
        Self::Telecommunications,
    ];
}

impl std::fmt::Display for IndustrySector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Manufacturing => "Manufacturing",
            Self::CommercialRealEstate => "Commercial Real Estate",
            Self::Technology => "Technology",
            Self::Healthcare => "Healthcare",
            Self::Retail => "Retail",
            Self::Energy => "Energy",
            Self::Financials => "Financials",
            Self::Aviation => "Aviation",
            Self::Logistics => "Logistics",
            Self::Telecommunications => "Telecommunications",
        };
        write!(f, "{}", s)
    }
}

/// A booked loan facility. The facility set is the authoritative client universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub client_id: String,
    pub industry_sector: IndustrySector,
    pub facility_amount_usd: u64,
    /// Margin over base rate, quoted in percent (2.35 = 235bp).
    #[serde(with = "rust_decimal::serde::str")]
    pub interest_rate_margin_pct: Rate,
    pub maturity_date: NaiveDate,
}

/// Check a facility set for the invariants the rest of the pipeline relies on:
/// unique client ids, positive amounts, non-negative margins.
pub fn validate_facilities(facilities: &[FacilityRecord]) -> LoanBookResult<()> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(facilities.len());
    for (idx, f) in facilities.iter().enumerate() {
        if f.client_id.trim().is_empty() {
            return Err(LoanBookError::InvalidInput {
                field: format!("facilities[{idx}].client_id"),
                reason: "Client id must not be empty.".into(),
            });
        }
        if let Some(first) = seen.insert(f.client_id.as_str(), idx) {
            return Err(LoanBookError::InvalidInput {
                field: format!("facilities[{idx}].client_id"),
                reason: format!(
                    "Duplicate client id '{}' (first seen at row {first}).",
                    f.client_id
                ),
            });
        }
        if f.facility_amount_usd == 0 {
            return Err(LoanBookError::InvalidInput {
                field: format!("facilities[{idx}].facility_amount_usd"),
                reason: "Facility amount must be positive.".into(),
            });
        }
        if f.interest_rate_margin_pct.is_sign_negative() {
            return Err(LoanBookError::InvalidInput {
                field: format!("facilities[{idx}].interest_rate_margin_pct"),
                reason: "Margin cannot be negative.".into(),
            });
        }
    }
    Ok(())
}

/// Index facilities by client id.
pub fn index_by_client(facilities: &[FacilityRecord]) -> HashMap<&str, &FacilityRecord> {
    facilities
        .iter()
        .map(|f| (f.client_id.as_str(), f))
        .collect()
}
