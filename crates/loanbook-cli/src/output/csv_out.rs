use serde_json::Value;
use std::io;

use super::cell;

/// Write a stage summary as two-column CSV (`field,value`) to stdout.
/// Nested breakdowns are flattened to dotted field names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let mut pairs = Vec::new();
    flatten("", body, &mut pairs);

    let _ = wtr.write_record(["field", "value"]);
    for (field, val) in pairs {
        let _ = wtr.write_record([field.as_str(), val.as_str()]);
    }
    let _ = wtr.flush();
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten(&join(k), v, out);
            }
        }
        Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                flatten(&join(&i.to_string()), v, out);
            }
        }
        scalar => out.push((prefix.to_string(), cell(scalar, ""))),
    }
}
