//! CSV-backed stores. Every write replaces the previous contents wholesale.

pub mod facility;
pub mod metrics;
pub mod report;
pub mod submission;

use std::fs;
use std::path::Path;

/// Make sure the parent directory of an output file exists.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
    }
    Ok(())
}

/// Serialize records to a CSV file with a header row.
pub(crate) fn write_records<T: serde::Serialize>(
    path: &Path,
    records: &[T],
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to open '{}' for writing: {}", path.display(), e))?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Deserialize every row of a CSV file.
pub(crate) fn read_records<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize().enumerate() {
        let record: T =
            row.map_err(|e| format!("Bad row {} in '{}': {}", idx + 1, path.display(), e))?;
        out.push(record);
    }
    Ok(out)
}
