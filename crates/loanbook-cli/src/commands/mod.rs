pub mod generate;
pub mod pipeline;
pub mod process;
pub mod rate;
pub mod report;

use serde::Serialize;
use serde_json::Value;

use loanbook_core::ComputationOutput;

/// Re-wrap a computation envelope around a compact summary, so stage output
/// keeps methodology, warnings and metadata without dumping every record.
pub(crate) fn envelope<T: Serialize>(
    output: &ComputationOutput<T>,
    summary: Value,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut value = serde_json::to_value(output)?;
    if let Value::Object(map) = &mut value {
        map.insert("result".into(), summary);
    }
    Ok(value)
}
