use serde_json::Value;

use super::{format_scalar, result_of};

/// Headline fields, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "payment",
    "max_home_price",
    "monthly_payment",
    "lowest_payment",
    "max_loan_amount",
];

/// Print just the key answer value from the output.
///
/// Looks for the headline field of each command, then the schedule
/// summary's monthly payment, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = result_of(value);

    if let Value::Object(map) = result_obj {
        let summary = map.get("summary").and_then(Value::as_object);
        let headline = PRIORITY_KEYS.iter().find_map(|key| {
            map.get(*key)
                .or_else(|| summary.and_then(|s| s.get(*key)))
                .filter(|v| !v.is_null())
        });
        if let Some(val) = headline {
            println!("{}", format_scalar(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
