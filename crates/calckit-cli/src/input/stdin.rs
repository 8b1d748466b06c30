use serde_json::Value;
use std::io::{self, Read};

/// Read piped input from stdin.
/// Returns None if stdin is a TTY or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Piped text is JSON or, failing that, YAML. A document that is neither
/// reports the JSON error.
fn parse_piped(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => match serde_yaml::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => Ok(Some(value)),
            _ => Err(format!("Failed to parse stdin: {json_err}").into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_pipe_is_no_input() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_document() {
        let v = parse_piped(r#"{"value": 10, "from": "ha", "to": "acre"}"#).unwrap();
        assert_eq!(v, Some(json!({ "value": 10, "from": "ha", "to": "acre" })));
    }

    #[test]
    fn test_yaml_document() {
        let v = parse_piped("value: 10\nfrom: ha\nto: acre\n").unwrap();
        assert_eq!(v, Some(json!({ "value": 10, "from": "ha", "to": "acre" })));
    }

    #[test]
    fn test_bare_scalar_is_rejected() {
        let err = parse_piped("hectares").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stdin"));
    }
}
