use serde_json::Value;

use super::scalar_text;

/// Headline fields, most specific first. The first non-null one present
/// in the result is printed on its own.
const PRIORITY_KEYS: [&str; 14] = [
    "rate",
    "price",
    "volatility",
    "payment",
    "future_value",
    "interest",
    "bmi",
    "tdee",
    "human",
    "seconds",
    "value",
    "result",
    "bmr",
    "total",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return scalar_text(val, "null");
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar_text(val, "null"));
        }
    }

    scalar_text(result_obj, "null")
}
