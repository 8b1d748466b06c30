pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value for text output.
pub(crate) fn scalar_text(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The first field of `result` holding a non-empty array of objects, such
/// as a loan's amortisation schedule.
pub(crate) fn nested_rows(result: &serde_json::Map<String, Value>) -> Option<(&str, &[Value])> {
    result.iter().find_map(|(k, v)| match v {
        Value::Array(rows) if matches!(rows.first(), Some(Value::Object(_))) => {
            Some((k.as_str(), rows.as_slice()))
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("ITM"), "null"), "ITM");
        assert_eq!(scalar_text(&json!(5.5), "null"), "5.5");
        assert_eq!(scalar_text(&Value::Null, ""), "");
        assert_eq!(scalar_text(&json!([1, 2]), ""), "[1,2]");
    }

    #[test]
    fn test_nested_rows_finds_schedule() {
        let result = json!({
            "payment": "1199.10",
            "schedule": [{ "period": 1 }, { "period": 2 }],
        });
        let (key, rows) = nested_rows(result.as_object().unwrap()).unwrap();
        assert_eq!(key, "schedule");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_nested_rows_skips_plain_arrays() {
        let result = json!({ "bracket": [0.0, 1.0], "schedule": [] });
        assert!(nested_rows(result.as_object().unwrap()).is_none());
    }
}
