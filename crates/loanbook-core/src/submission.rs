use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Label carrying the reporting year in every client submission.
pub const FISCAL_YEAR_LABEL: &str = "fiscal_year";

/// A loosely-typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(Decimal),
    Text(String),
    Null,
}

impl RawValue {
    /// Classify a raw cell as read from a file: blank is null, anything that
    /// parses as a decimal is a number, everything else stays text.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return RawValue::Null;
        }
        match Decimal::from_str(trimmed) {
            Ok(d) => RawValue::Number(d),
            Err(_) => RawValue::Text(trimmed.to_string()),
        }
    }

    /// Render the cell the way it would be written back to a file.
    pub fn to_cell(&self) -> String {
        match self {
            RawValue::Number(d) => d.to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Null => String::new(),
        }
    }
}

impl From<Decimal> for RawValue {
    fn from(d: Decimal) -> Self {
        RawValue::Number(d)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Null)
    }
}

/// One client's financial submission: a small table whose column labels are
/// whatever the client chose to call them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    pub client_id: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawSubmission {
    pub fn new(client_id: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            client_id: client_id.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a single-row submission from `(label, value)` pairs.
    pub fn single_row<L, V>(client_id: impl Into<String>, fields: Vec<(L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<RawValue>,
    {
        let (columns, row): (Vec<String>, Vec<RawValue>) = fields
            .into_iter()
            .map(|(l, v)| (l.into(), v.into()))
            .unzip();
        Self {
            client_id: client_id.into(),
            columns,
            rows: vec![row],
        }
    }

    pub fn push_row(&mut self, row: Vec<RawValue>) {
        self.rows.push(row);
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Cell at `(row, col)`; short rows read as null.
    pub fn value(&self, row: usize, col: usize) -> &RawValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&RawValue::Null)
    }

    /// Fiscal year from the first row, if the client supplied one.
    pub fn fiscal_year(&self) -> Option<i32> {
        let col = self.column_index(FISCAL_YEAR_LABEL)?;
        match self.value(0, col) {
            RawValue::Number(d) if d.fract().is_zero() => d.to_i32(),
            RawValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Derive the client id from a submission item name such as
/// `CORP_00042_financials.csv`.
pub fn client_id_from_item(name: &str) -> Option<&str> {
    let idx = name.find("_financials")?;
    let id = &name[..idx];
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Item name a submission is stored under, without extension.
pub fn item_name(client_id: &str) -> String {
    format!("{client_id}_financials")
}
