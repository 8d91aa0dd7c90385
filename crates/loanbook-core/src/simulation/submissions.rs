use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::seeded_rng;
use crate::reconciliation::{AliasTable, CanonicalField};
use crate::submission::{RawSubmission, RawValue, FISCAL_YEAR_LABEL};
use crate::types::*;
use crate::{LoanBookError, LoanBookResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionGenInput {
    /// Share of the book (taken from the front) that submits financials.
    #[serde(default = "default_submission_rate")]
    pub submission_rate: Rate,
    /// Chance a debt figure arrives as text with a currency prefix.
    #[serde(default = "default_dirty_debt")]
    pub dirty_debt_probability: f64,
    /// Chance EBITDA is left blank.
    #[serde(default = "default_missing_ebitda")]
    pub missing_ebitda_probability: f64,
    #[serde(default = "default_fiscal_year")]
    pub fiscal_year: i32,
    /// Optional seed for reproducibility.
    pub seed: Option<u64>,
}

fn default_submission_rate() -> Rate {
    Decimal::new(8, 1)
}

fn default_dirty_debt() -> f64 {
    0.05
}

fn default_missing_ebitda() -> f64 {
    0.02
}

fn default_fiscal_year() -> i32 {
    2025
}

impl Default for SubmissionGenInput {
    fn default() -> Self {
        Self {
            submission_rate: default_submission_rate(),
            dirty_debt_probability: default_dirty_debt(),
            missing_ebitda_probability: default_missing_ebitda(),
            fiscal_year: default_fiscal_year(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionGenOutput {
    pub submissions: Vec<RawSubmission>,
    /// Clients that were deliberately left without a submission.
    pub non_submitting: Vec<String>,
    pub dirty_debt_count: usize,
    pub missing_ebitda_count: usize,
}

/// Revenue range in USD, upper bound exclusive.
const REVENUE_RANGE: (i64, i64) = (10_000_000, 500_000_000);
/// EBITDA margin in basis points of revenue: 10% to 30%.
const EBITDA_MARGIN_BP: (i64, i64) = (1_000, 3_000);
/// Debt as a multiple of EBITDA, in hundredths: 2.0x to 5.0x.
const DEBT_MULTIPLE_CENTS: (i64, i64) = (200, 500);

/// Produce one messy submission per client for the first
/// `ceil(len * submission_rate)` clients. Each client picks its own label for
/// every field from the alias table; some debt figures are prefixed with
/// `USD ` and some EBITDA cells are left empty.
pub fn generate_submissions(
    client_ids: &[String],
    input: &SubmissionGenInput,
    aliases: &AliasTable,
) -> LoanBookResult<ComputationOutput<SubmissionGenOutput>> {
    let start = Instant::now();
    validate(input)?;
    aliases.validate()?;

    let submitting = (Decimal::from(client_ids.len() as u64) * input.submission_rate)
        .ceil()
        .to_usize()
        .unwrap_or(client_ids.len())
        .min(client_ids.len());

    let mut rng = seeded_rng(input.seed);
    let mut out = SubmissionGenOutput {
        submissions: Vec::with_capacity(submitting),
        non_submitting: client_ids[submitting..].to_vec(),
        dirty_debt_count: 0,
        missing_ebitda_count: 0,
    };

    for client_id in &client_ids[..submitting] {
        let sub = messy_submission(client_id, input, aliases, &mut rng, &mut out);
        out.submissions.push(sub);
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Synthetic client financial submissions with injected data-quality defects",
        &serde_json::json!({
            "submission_rate": input.submission_rate.to_string(),
            "dirty_debt_probability": input.dirty_debt_probability,
            "missing_ebitda_probability": input.missing_ebitda_probability,
            "fiscal_year": input.fiscal_year,
            "seed": input.seed,
        }),
        Vec::new(),
        elapsed,
        out,
    ))
}

fn messy_submission(
    client_id: &str,
    input: &SubmissionGenInput,
    aliases: &AliasTable,
    rng: &mut StdRng,
    tally: &mut SubmissionGenOutput,
) -> RawSubmission {
    let revenue_label = pick_label(aliases, CanonicalField::Revenue, rng);
    let ebitda_label = pick_label(aliases, CanonicalField::Ebitda, rng);
    let debt_label = pick_label(aliases, CanonicalField::TotalDebt, rng);

    let revenue = Decimal::from(rng.gen_range(REVENUE_RANGE.0..REVENUE_RANGE.1));
    let margin = Decimal::new(rng.gen_range(EBITDA_MARGIN_BP.0..EBITDA_MARGIN_BP.1), 4);
    let ebitda = (revenue * margin).trunc();
    let multiple = Decimal::new(rng.gen_range(DEBT_MULTIPLE_CENTS.0..DEBT_MULTIPLE_CENTS.1), 2);
    let total_debt = (ebitda * multiple).trunc();

    let debt_cell = if rng.gen_bool(input.dirty_debt_probability) {
        tally.dirty_debt_count += 1;
        RawValue::Text(format!("USD {total_debt}"))
    } else {
        RawValue::Number(total_debt)
    };
    let ebitda_cell = if rng.gen_bool(input.missing_ebitda_probability) {
        tally.missing_ebitda_count += 1;
        RawValue::Null
    } else {
        RawValue::Number(ebitda)
    };

    RawSubmission::single_row(
        client_id,
        vec![
            (revenue_label, RawValue::Number(revenue)),
            (ebitda_label, ebitda_cell),
            (debt_label, debt_cell),
            (
                FISCAL_YEAR_LABEL.to_string(),
                RawValue::Number(Decimal::from(input.fiscal_year)),
            ),
        ],
    )
}

fn pick_label(aliases: &AliasTable, field: CanonicalField, rng: &mut StdRng) -> String {
    aliases
        .aliases(field)
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| field.name().to_string())
}

fn validate(input: &SubmissionGenInput) -> LoanBookResult<()> {
    if input.submission_rate < Decimal::ZERO || input.submission_rate > Decimal::ONE {
        return Err(LoanBookError::InvalidInput {
            field: "submission_rate".into(),
            reason: "Must be within [0, 1]".into(),
        });
    }
    for (field, p) in [
        ("dirty_debt_probability", input.dirty_debt_probability),
        ("missing_ebitda_probability", input.missing_ebitda_probability),
    ] {
        if !(0.0..=1.0).contains(&p) {
            return Err(LoanBookError::InvalidInput {
                field: field.into(),
                reason: "Probability must be within [0, 1]".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::{canonicalize, clean};
    use rust_decimal_macros::dec;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("CORP_{i:05}")).collect()
    }

    fn seeded() -> SubmissionGenInput {
        SubmissionGenInput {
            seed: Some(7),
            ..SubmissionGenInput::default()
        }
    }

    #[test]
    fn test_submission_rate_takes_front_of_book() {
        let out = generate_submissions(&ids(10), &seeded(), &AliasTable::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.submissions.len(), 8);
        assert_eq!(r.submissions[0].client_id, "CORP_00001");
        assert_eq!(r.non_submitting, vec!["CORP_00009".to_string(), "CORP_00010".to_string()]);
    }

    #[test]
    fn test_labels_come_from_alias_table() {
        let table = AliasTable::default();
        let out = generate_submissions(&ids(40), &seeded(), &table).unwrap();
        for sub in &out.result.submissions {
            assert_eq!(sub.columns.len(), 4);
            assert_eq!(sub.columns[3], FISCAL_YEAR_LABEL);
            assert_eq!(table.resolve(&sub.columns[0]), Some(CanonicalField::Revenue));
            assert_eq!(table.resolve(&sub.columns[1]), Some(CanonicalField::Ebitda));
            assert_eq!(table.resolve(&sub.columns[2]), Some(CanonicalField::TotalDebt));
            assert_eq!(sub.fiscal_year(), Some(2025));
        }
    }

    #[test]
    fn test_clean_data_reconciles_within_bounds() {
        let input = SubmissionGenInput {
            dirty_debt_probability: 0.0,
            missing_ebitda_probability: 0.0,
            ..seeded()
        };
        let table = AliasTable::default();
        let out = generate_submissions(&ids(25), &input, &table).unwrap();
        for sub in &out.result.submissions {
            let cleaned = clean(&canonicalize(sub, &table).unwrap()).unwrap();
            let revenue = cleaned.revenue.unwrap();
            assert!(cleaned.ebitda >= (revenue * dec!(0.10)).trunc() - dec!(1));
            assert!(cleaned.ebitda <= revenue * dec!(0.30));
            assert!(cleaned.total_debt >= (cleaned.ebitda * dec!(2)).trunc() - dec!(1));
            assert!(cleaned.total_debt <= cleaned.ebitda * dec!(5));
        }
    }

    #[test]
    fn test_defects_injected_when_certain() {
        let input = SubmissionGenInput {
            dirty_debt_probability: 1.0,
            missing_ebitda_probability: 1.0,
            ..seeded()
        };
        let out = generate_submissions(&ids(5), &input, &AliasTable::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.dirty_debt_count, 4);
        assert_eq!(r.missing_ebitda_count, 4);
        let sub = &r.submissions[0];
        assert!(matches!(&sub.rows[0][2], RawValue::Text(s) if s.starts_with("USD ")));
        assert_eq!(sub.rows[0][1], RawValue::Null);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let input = SubmissionGenInput {
            dirty_debt_probability: 1.5,
            ..seeded()
        };
        assert!(generate_submissions(&ids(5), &input, &AliasTable::default()).is_err());
    }
}
