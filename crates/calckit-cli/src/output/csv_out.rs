use serde_json::Value;
use std::io::{self, Write};

use super::{nested_rows, scalar_text};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    // Broken pipes (`| head`) end the output quietly.
    let _ = write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match value {
        Value::Object(map) => match map.get("result") {
            // A result carrying a table (loan schedule) exports the table.
            Some(Value::Object(result)) => match nested_rows(result) {
                Some((_, rows)) => write_array_csv(wtr, rows),
                None => write_fields(wtr, result),
            },
            _ => write_fields(wtr, map),
        },
        Value::Array(arr) => write_array_csv(wtr, arr),
        _ => wtr.write_record([scalar_text(value, "")]),
    }
}

fn write_fields<W: Write>(
    wtr: &mut csv::Writer<W>,
    map: &serde_json::Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &scalar_text(val, "")])?;
    }
    Ok(())
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([scalar_text(item, "")])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(|v| scalar_text(v, "")).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_result_fields() {
        let out = render(&json!({ "result": { "bmi": 22.9, "category": "Normal weight" } }));
        assert_eq!(out, "field,value\nbmi,22.9\ncategory,Normal weight\n");
    }

    #[test]
    fn test_schedule_exported_as_rows() {
        let out = render(&json!({
            "result": {
                "payment": "100.00",
                "schedule": [
                    { "period": 1, "balance": "50.00" },
                    { "period": 2, "balance": "0.00" }
                ]
            }
        }));
        assert_eq!(out, "balance,period\n50.00,1\n0.00,2\n");
    }

    #[test]
    fn test_catalogue_array() {
        let out = render(&json!([{ "id": "ytm", "name": "Yield to Maturity" }]));
        assert_eq!(out, "id,name\nytm,Yield to Maturity\n");
    }
}
