use std::path::Path;

use loanbook_core::facility::{validate_facilities, FacilityRecord};

/// Load the facility book. A missing or malformed book aborts the run.
pub fn read_facilities(path: &Path) -> Result<Vec<FacilityRecord>, Box<dyn std::error::Error>> {
    let book: Vec<FacilityRecord> = super::read_records(path)?;
    validate_facilities(&book)?;
    Ok(book)
}

pub fn write_facilities(
    path: &Path,
    book: &[FacilityRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    super::write_records(path, book)
}
