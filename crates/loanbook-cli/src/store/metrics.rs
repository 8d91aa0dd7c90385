use std::path::Path;

use loanbook_core::metrics::MetricRecord;

pub fn write_metrics(path: &Path, metrics: &[MetricRecord]) -> Result<(), Box<dyn std::error::Error>> {
    super::write_records(path, metrics)
}

pub fn read_metrics(path: &Path) -> Result<Vec<MetricRecord>, Box<dyn std::error::Error>> {
    super::read_records(path)
}
