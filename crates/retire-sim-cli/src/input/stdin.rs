use serde_json::Value;
use std::io::{self, Read};

/// Read a piped request from stdin, as JSON or, failing that, YAML.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

fn parse_document(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => serde_yaml::from_str(trimmed)
            .map(Some)
            .map_err(|_| format!("stdin is neither valid JSON nor YAML: {json_err}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_document() {
        assert_eq!(parse_document("  \n").unwrap(), None);
        assert_eq!(
            parse_document(r#"{"currentAge": 50}"#).unwrap(),
            Some(json!({ "currentAge": 50 }))
        );
        assert_eq!(
            parse_document("currentAge: 50\n").unwrap(),
            Some(json!({ "currentAge": 50 }))
        );
    }
}
