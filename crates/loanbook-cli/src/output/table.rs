use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell;

/// Format a stage summary as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_object(map),
        },
        Value::Array(arr) => print_array(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_object(result);

    // Nested breakdowns get their own table beneath the summary.
    for (key, val) in result {
        match val {
            Value::Array(arr) if arr.iter().all(Value::is_object) && !arr.is_empty() => {
                println!("\n{}:", key);
                print_array(arr);
            }
            Value::Object(inner) if !inner.is_empty() => {
                println!("\n{}:", key);
                print_object(inner);
            }
            _ => {}
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if val.is_array() || val.is_object() {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val, "null")]);
    }
    println!("{}", Table::from(builder));
}

fn print_array(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(|v| cell(v, "null")).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", cell(item, "null"));
        }
    }
}
