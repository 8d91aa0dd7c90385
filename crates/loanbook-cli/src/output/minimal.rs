use serde_json::Value;

use super::cell;

/// Print the headline figure of a stage summary.
///
/// Looks for well-known summary fields in priority order, then falls back to
/// the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "dashboard_status",
        "internal_rating",
        "total_rows",
        "processed",
        "facilities_written",
        "submissions_written",
        "total_ecl_provision",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", cell(val, "null"));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val, "null"));
            return;
        }
    }

    println!("{}", cell(result_obj, "null"));
}
