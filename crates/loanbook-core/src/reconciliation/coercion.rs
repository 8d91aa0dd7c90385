use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::alias::{CanonicalField, CanonicalRow, CanonicalSubmission};
use crate::submission::RawValue;
use crate::types::Money;
use crate::{LoanBookError, LoanBookResult};

/// Reconciled financials for one client: the first row of its submission in
/// which EBITDA and total debt are both numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedFinancials {
    pub client_id: String,
    pub fiscal_year: Option<i32>,
    pub revenue: Option<Money>,
    pub ebitda: Money,
    pub total_debt: Money,
}

/// Coerce a dirty cell to a number.
///
/// Every character other than an ASCII digit or `.` is dropped and the rest is
/// parsed as a decimal, so `"USD 4,500,000"` becomes `4500000` and a leading
/// minus sign is lost. Blank, digit-free, multi-dot or overflowing leftovers
/// are `None`.
pub fn coerce_numeric(value: &RawValue) -> Option<Decimal> {
    let rendered = match value {
        RawValue::Null => return None,
        RawValue::Number(d) => d.to_string(),
        RawValue::Text(s) => s.clone(),
    };

    let mut kept: String = rendered
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !kept.chars().any(|c| c.is_ascii_digit()) || kept.matches('.').count() > 1 {
        return None;
    }
    if kept.starts_with('.') {
        kept.insert(0, '0');
    }
    if kept.ends_with('.') {
        kept.push('0');
    }
    Decimal::from_str(&kept).ok()
}

fn coerce_row(row: &CanonicalRow) -> (Option<Money>, Option<Money>, Option<Money>) {
    (
        coerce_numeric(&row.revenue),
        coerce_numeric(&row.ebitda),
        coerce_numeric(&row.total_debt),
    )
}

/// Coerce a canonicalised submission and keep its first usable row.
///
/// Rows where EBITDA or total debt does not coerce are dropped; revenue may be
/// missing. A submission with no surviving row fails with `CoercionFailure`.
pub fn clean(submission: &CanonicalSubmission) -> LoanBookResult<CleanedFinancials> {
    let usable = submission.rows.iter().map(coerce_row).find_map(|row| match row {
        (revenue, Some(ebitda), Some(total_debt)) => Some((revenue, ebitda, total_debt)),
        _ => None,
    });

    match usable {
        Some((revenue, ebitda, total_debt)) => Ok(CleanedFinancials {
            client_id: submission.client_id.clone(),
            fiscal_year: submission.fiscal_year,
            revenue,
            ebitda,
            total_debt,
        }),
        None => Err(LoanBookError::CoercionFailure {
            client_id: submission.client_id.clone(),
            field: failing_fields(submission),
        }),
    }
}

/// Name the mandatory fields that failed on the first row, for the error log.
fn failing_fields(submission: &CanonicalSubmission) -> String {
    let Some(first) = submission.rows.first() else {
        return format!("{}, {}", CanonicalField::Ebitda, CanonicalField::TotalDebt);
    };
    let (_, ebitda, debt) = coerce_row(first);
    let mut fields = Vec::new();
    if ebitda.is_none() {
        fields.push(CanonicalField::Ebitda.name());
    }
    if debt.is_none() {
        fields.push(CanonicalField::TotalDebt.name());
    }
    fields.join(", ")
}
