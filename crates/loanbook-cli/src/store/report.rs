use std::path::Path;

use loanbook_core::report::ReportRow;

/// Write the dashboard artifact. Missing metrics are written as empty cells.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), Box<dyn std::error::Error>> {
    super::write_records(path, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loanbook_core::facility::IndustrySector;
    use loanbook_core::report::DashboardStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_metrics_written_as_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_dashboard_data.csv");
        let row = ReportRow {
            client_id: "CORP_00900".into(),
            industry_sector: IndustrySector::Logistics,
            facility_amount_usd: 75_000_000,
            interest_rate_margin_pct: dec!(2.5),
            maturity_date: NaiveDate::from_ymd_opt(2030, 5, 17).unwrap(),
            revenue: None,
            ebitda: None,
            total_debt: None,
            icr: None,
            leverage_ratio: None,
            internal_rating: None,
            pd_percent: None,
            ecl_provision: None,
            dashboard_status: DashboardStatus::NonCompliant,
        };
        write_report(&path, &[row]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "client_id,industry_sector,facility_amount_usd,interest_rate_margin_pct,maturity_date,\
             revenue,ebitda,total_debt,icr,leverage_ratio,internal_rating,pd_percent,ecl_provision,\
             dashboard_status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "CORP_00900,Logistics,75000000,2.5,2030-05-17,,,,,,,,,Non-Compliant (Missing Financials)"
        );
    }
}
