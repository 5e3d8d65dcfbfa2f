use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, primary_rows, result_of};

/// Format output as tables using the tabled crate: one row table for the
/// primary array (schedule entries, comparison rows) and field/value tables
/// for everything else.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    match result {
        Value::Object(res_map) => {
            let primary = primary_rows(result);
            if let Some((_, rows)) = primary {
                print_row_table(rows);
            }

            let skip = primary.map(|(key, _)| key);
            let scalars: Vec<(&String, &Value)> = res_map
                .iter()
                .filter(|(k, v)| Some(k.as_str()) != skip && !v.is_object())
                .collect();
            if !scalars.is_empty() {
                print_field_table(scalars);
            }

            for (key, val) in res_map {
                if let Value::Object(nested) = val {
                    println!("\n{}:", key);
                    print_field_table(nested.iter().collect());
                }
            }
        }
        Value::Array(arr) => print_row_table(arr),
        other => println!("{}", format_scalar(other)),
    }

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

fn print_field_table(fields: Vec<(&String, &Value)>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_row_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        other => format_scalar(other),
    }
}
