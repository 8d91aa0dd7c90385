use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::metrics::InternalRating;
use crate::reconciliation::alias::AliasTable;
use crate::types::{Multiple, Rate};
use crate::{LoanBookError, LoanBookResult};

/// One row of the rating decision table. A client lands in `rating` when its
/// leverage is strictly below `leverage_below` AND its ICR is strictly above
/// `icr_above`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBand {
    pub rating: InternalRating,
    pub leverage_below: Multiple,
    pub icr_above: Multiple,
}

/// Probability of default per rating bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdTable {
    pub a: Rate,
    pub b: Rate,
    pub c: Rate,
}

impl PdTable {
    pub fn pd_for(&self, rating: InternalRating) -> Rate {
        match rating {
            InternalRating::A => self.a,
            InternalRating::B => self.b,
            InternalRating::C => self.c,
        }
    }
}

impl Default for PdTable {
    fn default() -> Self {
        Self {
            a: dec!(0.01),
            b: dec!(0.05),
            c: dec!(0.15),
        }
    }
}

/// Parameters of the credit-risk model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Reference rate the facility margin is added to (SOFR proxy).
    pub base_interest_rate: Rate,
    /// Loss given default applied to every facility.
    pub lgd: Rate,
    /// Evaluated top to bottom; first match wins.
    pub rating_bands: Vec<RatingBand>,
    /// Rating when no band matches.
    pub fallback_rating: InternalRating,
    pub pd_table: PdTable,
    /// Leverage reported when EBITDA is zero or negative.
    pub leverage_sentinel: Multiple,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_interest_rate: dec!(0.045),
            lgd: dec!(0.45),
            rating_bands: vec![
                RatingBand {
                    rating: InternalRating::A,
                    leverage_below: dec!(2.5),
                    icr_above: dec!(3.0),
                },
                RatingBand {
                    rating: InternalRating::B,
                    leverage_below: dec!(4.0),
                    icr_above: dec!(1.5),
                },
            ],
            fallback_rating: InternalRating::C,
            pd_table: PdTable::default(),
            leverage_sentinel: dec!(99),
        }
    }
}

/// Parameters of the dashboard action rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// B-rated facilities strictly above this amount need review.
    pub high_exposure_threshold_usd: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            high_exposure_threshold_usd: 150_000_000,
        }
    }
}

/// Everything the reconciliation and reporting stages can be tuned with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub risk: RiskConfig,
    pub report: ReportConfig,
    pub aliases: AliasTable,
}

impl PortfolioConfig {
    pub fn validate(&self) -> LoanBookResult<()> {
        self.risk.validate()?;
        self.aliases.validate()
    }
}

impl RiskConfig {
    pub fn validate(&self) -> LoanBookResult<()> {
        if self.base_interest_rate < Decimal::ZERO {
            return Err(LoanBookError::InvalidInput {
                field: "risk.base_interest_rate".into(),
                reason: "Base rate cannot be negative.".into(),
            });
        }
        check_unit_interval("risk.lgd", self.lgd)?;
        check_unit_interval("risk.pd_table.a", self.pd_table.a)?;
        check_unit_interval("risk.pd_table.b", self.pd_table.b)?;
        check_unit_interval("risk.pd_table.c", self.pd_table.c)?;
        if self.rating_bands.is_empty() {
            return Err(LoanBookError::InvalidInput {
                field: "risk.rating_bands".into(),
                reason: "At least one rating band is required.".into(),
            });
        }
        if self.leverage_sentinel <= Decimal::ZERO {
            return Err(LoanBookError::InvalidInput {
                field: "risk.leverage_sentinel".into(),
                reason: "Sentinel leverage must be positive.".into(),
            });
        }
        Ok(())
    }
}

fn check_unit_interval(field: &str, value: Rate) -> LoanBookResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(LoanBookError::InvalidInput {
            field: field.into(),
            reason: format!("Must be within [0, 1], got {value}."),
        });
    }
    Ok(())
}
