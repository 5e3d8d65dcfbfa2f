pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Result fields rendered as row tables, in preference order.
const ROW_FIELDS: [&str; 3] = ["entries", "rows", "movements"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// The first non-empty array of objects in `result`, checked in
/// `ROW_FIELDS` order.
fn primary_rows(result: &Value) -> Option<(&'static str, &[Value])> {
    let map = result.as_object()?;
    ROW_FIELDS.iter().find_map(|&key| match map.get(key) {
        Some(Value::Array(arr)) if arr.first().is_some_and(Value::is_object) => {
            Some((key, arr.as_slice()))
        }
        _ => None,
    })
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_rows_prefers_entries() {
        let v = json!({"result": {"entries": [{"month": 1}], "summary": {"payoff_month": 1}}});
        let (key, rows) = primary_rows(result_of(&v)).unwrap();
        assert_eq!(key, "entries");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_primary_rows_skips_empty_arrays() {
        let v = json!({"rows": [], "movements": [{"product": "fixed30"}]});
        let (key, _) = primary_rows(&v).unwrap();
        assert_eq!(key, "movements");
        assert!(primary_rows(&json!({"payment": "1520.06"})).is_none());
    }
}
