use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::alias::canonicalize;
use super::coercion::clean;
use crate::config::PortfolioConfig;
use crate::facility::{index_by_client, validate_facilities, FacilityRecord};
use crate::metrics::{compute_metrics, MetricRecord};
use crate::submission::{client_id_from_item, RawSubmission};
use crate::types::*;
use crate::{LoanBookError, LoanBookResult};

const PROGRESS_EVERY: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a submission was excluded from the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionErrorKind {
    /// The item could not be read as a table.
    Unreadable,
    /// Required canonical columns were absent after alias resolution.
    SchemaMismatch,
    /// EBITDA or total debt never coerced to a number.
    CoercionFailure,
    /// A second submission arrived for a client already processed.
    Duplicate,
    /// The figures were readable but too extreme to score.
    MetricOverflow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionFailure {
    pub client_id: Option<String>,
    pub kind: SubmissionErrorKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationOutput {
    /// One record per client that survived canonicalisation and coercion,
    /// ordered by client id.
    pub metrics: Vec<MetricRecord>,
    pub processed: usize,
    pub errored: usize,
    /// Submissions for clients outside the facility book; ignored, not errors.
    pub skipped_unknown_client: usize,
    pub error_breakdown: BTreeMap<SubmissionErrorKind, usize>,
    pub failures: Vec<SubmissionFailure>,
    pub total_ecl_provision: Money,
}

impl ReconciliationOutput {
    fn record_failure(&mut self, client_id: Option<String>, kind: SubmissionErrorKind, reason: String) {
        warn!(client_id = client_id.as_deref().unwrap_or("?"), ?kind, "{reason}");
        self.errored += 1;
        *self.error_breakdown.entry(kind).or_insert(0) += 1;
        self.failures.push(SubmissionFailure {
            client_id,
            kind,
            reason,
        });
    }
}

fn classify(err: &LoanBookError) -> (Option<String>, SubmissionErrorKind) {
    match err {
        LoanBookError::UnreadableSubmission { item, .. } => (
            client_id_from_item(item).map(str::to_string),
            SubmissionErrorKind::Unreadable,
        ),
        LoanBookError::SchemaMismatch { client_id, .. } => {
            (Some(client_id.clone()), SubmissionErrorKind::SchemaMismatch)
        }
        LoanBookError::CoercionFailure { client_id, .. } => {
            (Some(client_id.clone()), SubmissionErrorKind::CoercionFailure)
        }
        LoanBookError::MetricOverflow { client_id, .. } => {
            (Some(client_id.clone()), SubmissionErrorKind::MetricOverflow)
        }
        _ => (None, SubmissionErrorKind::Unreadable),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reconcile a stream of client submissions against the facility book and
/// compute credit metrics for every client with usable financials.
///
/// Per-submission problems (unreadable item, schema mismatch, coercion
/// failure) are counted and the run continues. Only an invalid configuration
/// or facility book aborts.
pub fn reconcile_submissions<I>(
    facilities: &[FacilityRecord],
    submissions: I,
    config: &PortfolioConfig,
) -> LoanBookResult<ComputationOutput<ReconciliationOutput>>
where
    I: IntoIterator<Item = LoanBookResult<RawSubmission>>,
{
    let start = Instant::now();
    config.validate()?;
    validate_facilities(facilities)?;

    let book = index_by_client(facilities);
    let mut seen: HashSet<String> = HashSet::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut out = ReconciliationOutput {
        metrics: Vec::new(),
        processed: 0,
        errored: 0,
        skipped_unknown_client: 0,
        error_breakdown: BTreeMap::new(),
        failures: Vec::new(),
        total_ecl_provision: Decimal::ZERO,
    };

    for item in submissions {
        let submission = match item {
            Ok(s) => s,
            Err(e) => {
                let (client_id, kind) = classify(&e);
                out.record_failure(client_id, kind, e.to_string());
                continue;
            }
        };

        let Some(facility) = book.get(submission.client_id.as_str()) else {
            debug!(client_id = %submission.client_id, "no facility on book; skipping");
            out.skipped_unknown_client += 1;
            continue;
        };

        if seen.contains(&submission.client_id) {
            out.record_failure(
                Some(submission.client_id.clone()),
                SubmissionErrorKind::Duplicate,
                format!("Duplicate submission for {}", submission.client_id),
            );
            continue;
        }

        let cleaned = match canonicalize(&submission, &config.aliases).and_then(|canon| {
            warnings.extend(canon.warnings.iter().cloned());
            clean(&canon)
        }) {
            Ok(c) => c,
            Err(e) => {
                let (client_id, kind) = classify(&e);
                out.record_failure(client_id, kind, e.to_string());
                continue;
            }
        };

        let record = match compute_metrics(&cleaned, facility, &config.risk) {
            Ok(r) => r,
            Err(e) => {
                let (client_id, kind) = classify(&e);
                out.record_failure(client_id.or(Some(cleaned.client_id)), kind, e.to_string());
                continue;
            }
        };
        debug!(
            client_id = %record.client_id,
            rating = %record.internal_rating,
            icr = %record.icr,
            leverage = %record.leverage_ratio,
            "scored"
        );
        seen.insert(submission.client_id);
        out.total_ecl_provision += record.ecl_provision;
        out.metrics.push(record);
        out.processed += 1;

        if out.processed % PROGRESS_EVERY == 0 {
            info!("Extracted {} submissions...", out.processed);
        }
    }

    out.metrics.sort_by(|a, b| a.client_id.cmp(&b.client_id));

    if out.processed == 0 {
        warnings.push("No submission produced usable financials.".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "base_interest_rate": config.risk.base_interest_rate.to_string(),
        "lgd": config.risk.lgd.to_string(),
        "leverage_sentinel": config.risk.leverage_sentinel.to_string(),
        "icr_when_no_interest_expense": "0",
        "rows_per_submission": "first usable row",
        "rounding": "icr, leverage_ratio, ecl_provision to 2dp",
    });

    Ok(with_metadata(
        "Financial submission reconciliation with rule-based rating and ECL",
        &assumptions,
        warnings,
        elapsed,
        out,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
