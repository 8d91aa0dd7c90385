use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use loanbook_core::submission::{client_id_from_item, item_name, RawSubmission, RawValue};
use loanbook_core::{LoanBookError, LoanBookResult};

const EXTENSION: &str = "csv";

fn is_submission_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(client_id_from_item)
            .is_some()
}

/// List the submission files in `dir`, sorted by name. Failing to open the
/// directory is a store-level error.
pub fn list_submissions(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("Failed to open submission store '{}': {}", dir.display(), e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if is_submission_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Lazily read every submission in `dir`. Each item yields its own result so a
/// single unreadable file does not stop the scan.
pub fn scan_submissions(
    dir: &Path,
) -> Result<impl Iterator<Item = LoanBookResult<RawSubmission>>, Box<dyn std::error::Error>> {
    let paths = list_submissions(dir)?;
    Ok(paths.into_iter().map(|p| read_submission(&p)))
}

fn unreadable(item: &str, reason: impl std::fmt::Display) -> LoanBookError {
    LoanBookError::UnreadableSubmission {
        item: item.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse one `{client_id}_financials.csv` file: a header row of client-chosen
/// labels followed by data rows.
pub fn read_submission(path: &Path) -> LoanBookResult<RawSubmission> {
    let item = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let client_id = client_id_from_item(&item)
        .ok_or_else(|| unreadable(&item, "file name does not carry a client id"))?
        .to_string();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| unreadable(&item, e))?;

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| unreadable(&item, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(unreadable(&item, "no header row"));
    }

    let mut submission = RawSubmission::new(client_id, columns);
    for record in rdr.records() {
        let record = record.map_err(|e| unreadable(&item, e))?;
        submission.push_row(record.iter().map(RawValue::from_cell).collect());
    }
    Ok(submission)
}

/// Replace the submission store with `submissions`. Stale submission files
/// are removed; anything else in the directory is left alone.
pub fn write_submissions(
    dir: &Path,
    submissions: &[RawSubmission],
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;
    for stale in list_submissions(dir)? {
        fs::remove_file(&stale)?;
    }
    for (i, sub) in submissions.iter().enumerate() {
        let path = dir.join(format!("{}.{}", item_name(&sub.client_id), EXTENSION));
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| format!("Failed to open '{}' for writing: {}", path.display(), e))?;
        wtr.write_record(&sub.columns)?;
        for row in &sub.rows {
            wtr.write_record(row.iter().map(RawValue::to_cell))?;
        }
        wtr.flush()?;
        if (i + 1) % 100 == 0 {
            info!("Generated {} files...", i + 1);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample() -> RawSubmission {
        RawSubmission::single_row(
            "CORP_00003",
            vec![
                ("Total Revenue", RawValue::Number(dec!(250000000))),
                ("Op_Profit", RawValue::Null),
                ("Loan_Balance", RawValue::Text("USD 4500000".into())),
                ("fiscal_year", RawValue::Number(dec!(2025))),
            ],
        )
    }

    #[test]
    fn test_write_then_scan() {
        let dir = tempfile::tempdir().unwrap();
        write_submissions(dir.path(), &[sample()]).unwrap();
        assert!(dir.path().join("CORP_00003_financials.csv").exists());

        let subs: Vec<_> = scan_submissions(dir.path()).unwrap().collect();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].as_ref().unwrap(), &sample());
    }

    #[test]
    fn test_unrelated_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.txt"), "hello").unwrap();
        fs::write(dir.path().join("CORP_00001_financials.xlsx"), "binary").unwrap();
        fs::write(dir.path().join("summary.csv"), "a,b\n1,2\n").unwrap();
        assert!(list_submissions(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CORP_00009_financials.csv");
        fs::write(&path, "Sales,EBITDA,Total Debt\n1,2\n").unwrap();
        match read_submission(&path).unwrap_err() {
            LoanBookError::UnreadableSubmission { item, .. } => {
                assert_eq!(item, "CORP_00009_financials.csv")
            }
            other => panic!("Expected UnreadableSubmission, got {other:?}"),
        }
    }

    #[test]
    fn test_rewrite_removes_stale_submissions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("CORP_00777_financials.csv"), "Sales\n1\n").unwrap();
        fs::write(dir.path().join("notes.md"), "keep me").unwrap();
        write_submissions(dir.path(), &[sample()]).unwrap();
        assert!(!dir.path().join("CORP_00777_financials.csv").exists());
        assert!(dir.path().join("notes.md").exists());
    }

    #[test]
    fn test_missing_store_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_submissions(&dir.path().join("absent")).is_err());
    }
}
