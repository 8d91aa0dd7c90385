use chrono::NaiveDate;
use loanbook_core::facility::{FacilityRecord, IndustrySector};
use loanbook_core::metrics::InternalRating;
use loanbook_core::reconciliation::{reconcile_submissions, AliasTable};
use loanbook_core::report::{build_report, DashboardStatus};
use loanbook_core::simulation::{
    generate_facilities, generate_submissions, FacilityGenInput, SubmissionGenInput,
};
use loanbook_core::submission::{RawSubmission, RawValue};
use loanbook_core::{LoanBookResult, PortfolioConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

fn facility(id: &str, amount: u64, margin: Decimal) -> FacilityRecord {
    FacilityRecord {
        client_id: id.into(),
        industry_sector: IndustrySector::Manufacturing,
        facility_amount_usd: amount,
        interest_rate_margin_pct: margin,
        maturity_date: NaiveDate::from_ymd_opt(2029, 9, 30).unwrap(),
    }
}

fn submission(id: &str, ebitda: RawValue, debt: RawValue) -> LoanBookResult<RawSubmission> {
    Ok(RawSubmission::single_row(
        id,
        vec![
            ("Sales", RawValue::Number(dec!(100_000_000))),
            ("EBITDA", ebitda),
            ("Liabilities_Total", debt),
            ("fiscal_year", RawValue::Number(dec!(2025))),
        ],
    ))
}

// ===========================================================================
// Generated book end to end
// ===========================================================================

#[test]
fn test_generated_book_report_covers_every_facility() {
    let config = PortfolioConfig::default();
    let book = generate_facilities(&FacilityGenInput {
        count: 300,
        seed: Some(42),
        ..FacilityGenInput::default()
    })
    .unwrap()
    .result
    .facilities;

    let ids: Vec<String> = book.iter().map(|f| f.client_id.clone()).collect();
    let subs = generate_submissions(
        &ids,
        &SubmissionGenInput {
            seed: Some(42),
            ..SubmissionGenInput::default()
        },
        &config.aliases,
    )
    .unwrap()
    .result;
    assert_eq!(subs.submissions.len(), 240);

    let recon = reconcile_submissions(
        &book,
        subs.submissions.into_iter().map(Ok),
        &config,
    )
    .unwrap()
    .result;

    // Dirty debt always cleans; only missing EBITDA is lost.
    assert_eq!(recon.processed + recon.errored, 240);
    assert_eq!(recon.errored, subs.missing_ebitda_count);

    let report = build_report(&book, &recon.metrics, &config.report)
        .unwrap()
        .result;
    assert_eq!(report.total_rows, book.len());

    let facility_ids: HashSet<&str> = book.iter().map(|f| f.client_id.as_str()).collect();
    let report_ids: HashSet<&str> = report.rows.iter().map(|r| r.client_id.as_str()).collect();
    assert_eq!(facility_ids, report_ids);

    for row in &report.rows {
        match row.internal_rating {
            None => {
                assert_eq!(row.dashboard_status, DashboardStatus::NonCompliant);
                assert_eq!(row.pd_percent, None);
            }
            Some(InternalRating::A) => assert_eq!(row.pd_percent, Some(dec!(0.01))),
            Some(InternalRating::B) => assert_eq!(row.pd_percent, Some(dec!(0.05))),
            Some(InternalRating::C) => {
                assert_eq!(row.pd_percent, Some(dec!(0.15)));
                assert_eq!(row.dashboard_status, DashboardStatus::CriticalWatchlist);
            }
        }
    }

    let non_compliant = report
        .status_breakdown
        .iter()
        .find(|s| s.status == DashboardStatus::NonCompliant)
        .map(|s| s.count)
        .unwrap_or(0);
    assert_eq!(non_compliant, 60 + recon.errored);
    let counted: usize = report.status_breakdown.iter().map(|s| s.count).sum();
    assert_eq!(counted, 300);
}

// ===========================================================================
// Worked scenarios
// ===========================================================================

#[test]
fn test_scenarios_through_full_pipeline() {
    let config = PortfolioConfig::default();
    // Margin 0.5% => rate 0.05.
    let book = vec![
        // Leverage 2.0, ICR = 10 / (20 * 0.05) = 10 => A
        facility("CORP_00001", 80_000_000, dec!(0.5)),
        // Leverage 3.5, ICR = 10 / (35 * 0.05) = 5.71 => B, large => review
        facility("CORP_00002", 200_000_000, dec!(0.5)),
        // Leverage 5.0 => C
        facility("CORP_00003", 200_000_000, dec!(0.5)),
        // Never submitted
        facility("CORP_00004", 20_000_000, dec!(0.5)),
        // Dirty debt string
        facility("CORP_00005", 20_000_000, dec!(0.5)),
    ];
    let subs = vec![
        submission("CORP_00001", dec!(10).into(), dec!(20).into()),
        submission("CORP_00002", dec!(10).into(), dec!(35).into()),
        submission("CORP_00003", dec!(10).into(), dec!(50).into()),
        submission("CORP_00005", dec!(1_500_000).into(), "USD 4500000".into()),
    ];

    let recon = reconcile_submissions(&book, subs, &config).unwrap().result;
    assert_eq!(recon.processed, 4);
    assert_eq!(recon.errored, 0);

    let report = build_report(&book, &recon.metrics, &config.report)
        .unwrap()
        .result;
    let rows = &report.rows;

    assert_eq!(rows[0].internal_rating, Some(InternalRating::A));
    assert_eq!(rows[0].leverage_ratio, Some(dec!(2)));
    assert_eq!(rows[0].dashboard_status, DashboardStatus::Performing);

    assert_eq!(rows[1].internal_rating, Some(InternalRating::B));
    assert_eq!(rows[1].icr, Some(dec!(5.71)));
    assert_eq!(rows[1].dashboard_status, DashboardStatus::ReviewRequired);

    assert_eq!(rows[2].internal_rating, Some(InternalRating::C));
    assert_eq!(rows[2].pd_percent, Some(dec!(0.15)));
    assert_eq!(rows[2].dashboard_status, DashboardStatus::CriticalWatchlist);
    // ECL = 200M * 0.15 * 0.45
    assert_eq!(rows[2].ecl_provision, Some(dec!(13_500_000)));

    assert_eq!(rows[3].internal_rating, None);
    assert_eq!(rows[3].ebitda, None);
    assert_eq!(rows[3].dashboard_status, DashboardStatus::NonCompliant);

    assert_eq!(rows[4].total_debt, Some(dec!(4_500_000)));
    assert_eq!(rows[4].leverage_ratio, Some(dec!(3)));
}

#[test]
fn test_alias_choice_gives_identical_metrics() {
    let config = PortfolioConfig::default();
    let book = vec![
        facility("CORP_00001", 50_000_000, dec!(2.25)),
        facility("CORP_00002", 50_000_000, dec!(2.25)),
    ];
    let a = RawSubmission::single_row(
        "CORP_00001",
        vec![("Sales", dec!(90)), ("Op_Profit", dec!(18)), ("Loan_Balance", dec!(54))],
    );
    let b = RawSubmission::single_row(
        "CORP_00002",
        vec![
            ("Gross_Income", dec!(90)),
            ("Earnings_Before_Interest", dec!(18)),
            ("Total Debt", dec!(54)),
        ],
    );
    let recon = reconcile_submissions(&book, vec![Ok(a), Ok(b)], &config)
        .unwrap()
        .result;
    let (x, y) = (&recon.metrics[0], &recon.metrics[1]);
    assert_eq!(x.icr, y.icr);
    assert_eq!(x.leverage_ratio, y.leverage_ratio);
    assert_eq!(x.internal_rating, y.internal_rating);
    assert_eq!(x.ecl_provision, y.ecl_provision);
}

// ===========================================================================
// Configuration drives thresholds
// ===========================================================================

#[test]
fn test_custom_thresholds_apply() {
    let mut config = PortfolioConfig::default();
    config.report.high_exposure_threshold_usd = 10_000_000;
    config.risk.lgd = dec!(0.60);

    let book = vec![facility("CORP_00001", 20_000_000, dec!(0.5))];
    let subs = vec![submission("CORP_00001", dec!(10).into(), dec!(35).into())];
    let recon = reconcile_submissions(&book, subs, &config).unwrap().result;
    let m = &recon.metrics[0];
    assert_eq!(m.internal_rating, InternalRating::B);
    // ECL = 20M * 0.05 * 0.60 = 600k
    assert_eq!(m.ecl_provision, dec!(600_000));

    let report = build_report(&book, &recon.metrics, &config.report)
        .unwrap()
        .result;
    assert_eq!(report.rows[0].dashboard_status, DashboardStatus::ReviewRequired);
}

#[test]
fn test_custom_alias_table_from_json() {
    let config: PortfolioConfig = serde_json::from_value(serde_json::json!({
        "aliases": {
            "Revenue": ["Turnover"],
            "EBITDA": ["Adj. EBITDA"],
            "Total_Debt": ["Gross Debt"]
        }
    }))
    .unwrap();
    assert_ne!(config.aliases, AliasTable::default());

    let book = vec![facility("CORP_00001", 20_000_000, dec!(0.5))];
    let sub = RawSubmission::single_row(
        "CORP_00001",
        vec![("Turnover", dec!(50)), ("Adj. EBITDA", dec!(10)), ("Gross Debt", dec!(20))],
    );
    let recon = reconcile_submissions(&book, vec![Ok(sub)], &config)
        .unwrap()
        .result;
    assert_eq!(recon.processed, 1);
}
