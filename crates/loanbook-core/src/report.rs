use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use crate::config::ReportConfig;
use crate::facility::{validate_facilities, FacilityRecord, IndustrySector};
use crate::metrics::{InternalRating, MetricRecord};
use crate::types::*;
use crate::LoanBookResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the desk should do about a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DashboardStatus {
    #[serde(rename = "Non-Compliant (Missing Financials)")]
    NonCompliant,
    #[serde(rename = "Critical Watchlist")]
    CriticalWatchlist,
    #[serde(rename = "Review Required (High Exposure)")]
    ReviewRequired,
    #[serde(rename = "Performing")]
    Performing,
}

impl DashboardStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NonCompliant => "Non-Compliant (Missing Financials)",
            Self::CriticalWatchlist => "Critical Watchlist",
            Self::ReviewRequired => "Review Required (High Exposure)",
            Self::Performing => "Performing",
        }
    }
}

impl std::fmt::Display for DashboardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One line of the dashboard: a facility with its metrics, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub client_id: String,
    pub industry_sector: IndustrySector,
    pub facility_amount_usd: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub interest_rate_margin_pct: Rate,
    pub maturity_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub revenue: Option<Money>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub ebitda: Option<Money>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub total_debt: Option<Money>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub icr: Option<Multiple>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub leverage_ratio: Option<Multiple>,
    pub internal_rating: Option<InternalRating>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub pd_percent: Option<Rate>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub ecl_provision: Option<Money>,
    pub dashboard_status: DashboardStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: DashboardStatus,
    pub count: usize,
    pub exposure_usd: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub rows: Vec<ReportRow>,
    pub total_rows: usize,
    /// Most frequent status first.
    pub status_breakdown: Vec<StatusCount>,
    /// Rated clients per bucket; unrated clients are not listed.
    pub rating_distribution: BTreeMap<InternalRating, usize>,
    pub total_exposure_usd: u64,
    pub total_ecl_provision: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply the action rules in order; the first that matches decides.
pub fn classify_status(
    metric: Option<&MetricRecord>,
    facility_amount_usd: u64,
    config: &ReportConfig,
) -> DashboardStatus {
    let Some(m) = metric else {
        return DashboardStatus::NonCompliant;
    };
    match m.internal_rating {
        InternalRating::C => DashboardStatus::CriticalWatchlist,
        InternalRating::B if facility_amount_usd > config.high_exposure_threshold_usd => {
            DashboardStatus::ReviewRequired
        }
        _ => DashboardStatus::Performing,
    }
}

/// Left-join every facility with its metrics and classify it.
///
/// Exactly one row per facility, in facility order. Metrics for clients not
/// on the book are ignored.
pub fn build_report(
    facilities: &[FacilityRecord],
    metrics: &[MetricRecord],
    config: &ReportConfig,
) -> LoanBookResult<ComputationOutput<ReportOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_facilities(facilities)?;

    let mut by_client: HashMap<&str, &MetricRecord> = HashMap::with_capacity(metrics.len());
    for m in metrics {
        if by_client.insert(m.client_id.as_str(), m).is_some() {
            warnings.push(format!(
                "Multiple metric records for {}; using the last one.",
                m.client_id
            ));
        }
    }

    let rows: Vec<ReportRow> = facilities
        .iter()
        .map(|f| {
            let metric = by_client.get(f.client_id.as_str()).copied();
            report_row(f, metric, config)
        })
        .collect();

    let on_book: HashSet<&str> = facilities.iter().map(|f| f.client_id.as_str()).collect();
    let orphaned = by_client.keys().filter(|id| !on_book.contains(*id)).count();
    if orphaned > 0 {
        warnings.push(format!(
            "{orphaned} metric record(s) have no facility on the book and were ignored."
        ));
    }

    let output = summarise(rows);

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "join": "facility LEFT JOIN metrics ON client_id",
        "high_exposure_threshold_usd": config.high_exposure_threshold_usd,
        "rule_order": [
            DashboardStatus::NonCompliant.label(),
            DashboardStatus::CriticalWatchlist.label(),
            DashboardStatus::ReviewRequired.label(),
            DashboardStatus::Performing.label(),
        ],
    });

    Ok(with_metadata(
        "Executive dashboard: facility book joined with credit metrics",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

fn report_row(f: &FacilityRecord, m: Option<&MetricRecord>, config: &ReportConfig) -> ReportRow {
    ReportRow {
        client_id: f.client_id.clone(),
        industry_sector: f.industry_sector,
        facility_amount_usd: f.facility_amount_usd,
        interest_rate_margin_pct: f.interest_rate_margin_pct,
        maturity_date: f.maturity_date,
        revenue: m.and_then(|m| m.revenue),
        ebitda: m.map(|m| m.ebitda),
        total_debt: m.map(|m| m.total_debt),
        icr: m.map(|m| m.icr),
        leverage_ratio: m.map(|m| m.leverage_ratio),
        internal_rating: m.map(|m| m.internal_rating),
        pd_percent: m.map(|m| m.pd_percent),
        ecl_provision: m.map(|m| m.ecl_provision),
        dashboard_status: classify_status(m, f.facility_amount_usd, config),
    }
}

fn summarise(rows: Vec<ReportRow>) -> ReportOutput {
    let mut status: HashMap<DashboardStatus, (usize, u64)> = HashMap::new();
    let mut rating_distribution = BTreeMap::new();
    let mut total_exposure_usd = 0u64;
    let mut total_ecl_provision = Decimal::ZERO;

    for row in &rows {
        let entry = status.entry(row.dashboard_status).or_insert((0, 0));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(row.facility_amount_usd);
        if let Some(r) = row.internal_rating {
            *rating_distribution.entry(r).or_insert(0) += 1;
        }
        total_exposure_usd = total_exposure_usd.saturating_add(row.facility_amount_usd);
        total_ecl_provision += row.ecl_provision.unwrap_or(Decimal::ZERO);
    }

    let mut status_breakdown: Vec<StatusCount> = status
        .into_iter()
        .map(|(status, (count, exposure_usd))| StatusCount {
            status,
            count,
            exposure_usd,
        })
        .collect();
    status_breakdown.sort_by(|a, b| b.count.cmp(&a.count).then(a.status.cmp(&b.status)));

    ReportOutput {
        total_rows: rows.len(),
        rows,
        status_breakdown,
        rating_distribution,
        total_exposure_usd,
        total_ecl_provision,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn facility(id: &str, amount: u64) -> FacilityRecord {
        FacilityRecord {
            client_id: id.into(),
            industry_sector: IndustrySector::Aviation,
            facility_amount_usd: amount,
            interest_rate_margin_pct: dec!(3.1),
            maturity_date: NaiveDate::from_ymd_opt(2031, 12, 1).unwrap(),
        }
    }

    fn metric(id: &str, rating: InternalRating) -> MetricRecord {
        MetricRecord {
            client_id: id.into(),
            revenue: Some(dec!(100)),
            ebitda: dec!(20),
            total_debt: dec!(60),
            estimated_interest_rate: dec!(0.076),
            annual_interest_expense: dec!(4.56),
            icr: dec!(4.39),
            leverage_ratio: dec!(3),
            internal_rating: rating,
            pd_percent: dec!(0.05),
            ecl_provision: dec!(1000),
        }
    }

    #[test]
    fn test_status_rules() {
        let cfg = ReportConfig::default();
        assert_eq!(classify_status(None, 1, &cfg), DashboardStatus::NonCompliant);
        let c = metric("X", InternalRating::C);
        assert_eq!(
            classify_status(Some(&c), 200_000_000, &cfg),
            DashboardStatus::CriticalWatchlist
        );
        let b = metric("X", InternalRating::B);
        assert_eq!(
            classify_status(Some(&b), 200_000_000, &cfg),
            DashboardStatus::ReviewRequired
        );
        // Threshold is strict.
        assert_eq!(
            classify_status(Some(&b), 150_000_000, &cfg),
            DashboardStatus::Performing
        );
        let a = metric("X", InternalRating::A);
        assert_eq!(
            classify_status(Some(&a), 240_000_000, &cfg),
            DashboardStatus::Performing
        );
    }

    #[test]
    fn test_one_row_per_facility() {
        let book = vec![
            facility("CORP_00001", 10),
            facility("CORP_00002", 20),
            facility("CORP_00003", 30),
        ];
        let metrics = vec![
            metric("CORP_00003", InternalRating::C),
            metric("CORP_00001", InternalRating::A),
            metric("CORP_07777", InternalRating::B),
        ];
        let out = build_report(&book, &metrics, &ReportConfig::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.total_rows, 3);
        let ids: Vec<&str> = r.rows.iter().map(|row| row.client_id.as_str()).collect();
        assert_eq!(ids, vec!["CORP_00001", "CORP_00002", "CORP_00003"]);

        let missing = &r.rows[1];
        assert_eq!(missing.internal_rating, None);
        assert_eq!(missing.icr, None);
        assert_eq!(missing.ecl_provision, None);
        assert_eq!(missing.dashboard_status, DashboardStatus::NonCompliant);

        assert_eq!(r.rows[2].dashboard_status, DashboardStatus::CriticalWatchlist);
        assert_eq!(r.total_exposure_usd, 60);
        assert_eq!(r.total_ecl_provision, dec!(2000));
        assert!(out.warnings.iter().any(|w| w.contains("no facility")));
    }

    #[test]
    fn test_breakdown_sorted_by_count() {
        let book = vec![
            facility("CORP_00001", 10),
            facility("CORP_00002", 20),
            facility("CORP_00003", 30),
        ];
        let metrics = vec![metric("CORP_00003", InternalRating::A)];
        let out = build_report(&book, &metrics, &ReportConfig::default()).unwrap();
        let b = &out.result.status_breakdown;
        assert_eq!(b[0].status, DashboardStatus::NonCompliant);
        assert_eq!(b[0].count, 2);
        assert_eq!(b[0].exposure_usd, 30);
        assert_eq!(b[1].status, DashboardStatus::Performing);
        assert_eq!(out.result.rating_distribution[&InternalRating::A], 1);
        assert!(!out.result.rating_distribution.contains_key(&InternalRating::B));
    }

    #[test]
    fn test_status_serialises_as_label() {
        let json = serde_json::to_string(&DashboardStatus::ReviewRequired).unwrap();
        assert_eq!(json, "\"Review Required (High Exposure)\"");
    }

    #[test]
    fn test_exposure_totals_saturate() {
        let book = vec![facility("CORP_00001", u64::MAX), facility("CORP_00002", u64::MAX)];
        let out = build_report(&book, &[], &ReportConfig::default()).unwrap();
        assert_eq!(out.result.total_exposure_usd, u64::MAX);
        assert_eq!(out.result.status_breakdown[0].exposure_usd, u64::MAX);
        assert_eq!(out.result.status_breakdown[0].count, 2);
    }
}
