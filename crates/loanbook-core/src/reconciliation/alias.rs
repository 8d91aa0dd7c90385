use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::submission::{RawSubmission, RawValue};
use crate::{LoanBookError, LoanBookResult};

/// The three financial fields every submission must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Revenue,
    #[serde(rename = "EBITDA")]
    Ebitda,
    #[serde(rename = "Total_Debt")]
    TotalDebt,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 3] = [Self::Revenue, Self::Ebitda, Self::TotalDebt];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Ebitda => "EBITDA",
            Self::TotalDebt => "Total_Debt",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Self::Revenue => 0,
            Self::Ebitda => 1,
            Self::TotalDebt => 2,
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Known raw column labels for each canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<CanonicalField, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            CanonicalField::Revenue,
            labels(&["Revenue", "Total Revenue", "Sales", "Gross_Income", "Rev"]),
        );
        entries.insert(
            CanonicalField::Ebitda,
            labels(&[
                "EBITDA",
                "Op_Profit",
                "Earnings_Before_Interest",
                "Operating_Income",
            ]),
        );
        entries.insert(
            CanonicalField::TotalDebt,
            labels(&[
                "Total Debt",
                "Debt_Exposure",
                "Liabilities_Total",
                "Loan_Balance",
            ]),
        );
        Self { entries }
    }
}

fn labels(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

impl AliasTable {
    pub fn new(entries: BTreeMap<CanonicalField, Vec<String>>) -> LoanBookResult<Self> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Aliases registered for `field`, in declaration order.
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Map a raw label to its canonical field. Labels match exactly; the
    /// canonical name itself always resolves.
    pub fn resolve(&self, label: &str) -> Option<CanonicalField> {
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a == label))
            .map(|(field, _)| *field)
            .or_else(|| CanonicalField::ALL.into_iter().find(|f| f.name() == label))
    }

    /// A label may belong to at most one canonical field.
    pub fn validate(&self) -> LoanBookResult<()> {
        let mut owner: BTreeMap<&str, CanonicalField> = BTreeMap::new();
        for (field, aliases) in &self.entries {
            for alias in aliases {
                if alias.is_empty() {
                    return Err(LoanBookError::InvalidInput {
                        field: format!("aliases.{field}"),
                        reason: "Alias labels must not be empty.".into(),
                    });
                }
                if let Some(prev) = owner.insert(alias.as_str(), *field) {
                    if prev != *field {
                        return Err(LoanBookError::InvalidInput {
                            field: format!("aliases.{field}"),
                            reason: format!("Label '{alias}' is already an alias of {prev}."),
                        });
                    }
                }
            }
        }
        for canonical in CanonicalField::ALL {
            if let Some(other) = owner.get(canonical.name()) {
                if *other != canonical {
                    return Err(LoanBookError::InvalidInput {
                        field: format!("aliases.{other}"),
                        reason: format!("Canonical name '{canonical}' cannot alias {other}."),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Submission row reduced to the three canonical fields, values untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub revenue: RawValue,
    pub ebitda: RawValue,
    pub total_debt: RawValue,
}

/// A submission whose labels have all been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSubmission {
    pub client_id: String,
    pub fiscal_year: Option<i32>,
    pub rows: Vec<CanonicalRow>,
    pub warnings: Vec<String>,
}

/// Rewrite a submission's labels to canonical fields.
///
/// Unrecognised labels are ignored. Fails with `SchemaMismatch` unless all
/// three canonical fields are present; a partially mapped submission is never
/// passed on. When two labels resolve to the same field the leftmost column
/// is kept.
pub fn canonicalize(
    submission: &RawSubmission,
    table: &AliasTable,
) -> LoanBookResult<CanonicalSubmission> {
    let mut positions: [Option<usize>; 3] = [None; 3];
    let mut warnings = Vec::new();

    for (col, label) in submission.columns.iter().enumerate() {
        let Some(field) = table.resolve(label) else {
            continue;
        };
        let slot = field.slot();
        if let Some(kept) = positions[slot] {
            warnings.push(format!(
                "{}: column '{}' also maps to {}; keeping '{}'",
                submission.client_id, label, field, submission.columns[kept]
            ));
        } else {
            positions[slot] = Some(col);
        }
    }

    let missing: Vec<String> = CanonicalField::ALL
        .iter()
        .filter(|f| positions[f.slot()].is_none())
        .map(|f| f.name().to_string())
        .collect();

    let (Some(rev), Some(ebitda), Some(debt)) = (positions[0], positions[1], positions[2]) else {
        return Err(LoanBookError::SchemaMismatch {
            client_id: submission.client_id.clone(),
            missing,
        });
    };

    let rows = (0..submission.rows.len())
        .map(|r| CanonicalRow {
            revenue: submission.value(r, rev).clone(),
            ebitda: submission.value(r, ebitda).clone(),
            total_debt: submission.value(r, debt).clone(),
        })
        .collect();

    Ok(CanonicalSubmission {
        client_id: submission.client_id.clone(),
        fiscal_year: submission.fiscal_year(),
        rows,
        warnings,
    })
}
