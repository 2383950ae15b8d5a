//! Shared helpers for command handlers.

use std::io::Read;

use serde_json::Value;

use crate::cli::DataInput;
use crate::error::CliError;

/// Read the JSON document named by a [`DataInput`]: inline text, `-` for
/// stdin, or `--file`.
pub fn read_json_input(input: &DataInput) -> Result<Value, CliError> {
    let text = match (input.data.as_deref(), input.file.as_deref()) {
        (Some("-"), _) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (Some(inline), _) => inline.to_owned(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::Validation {
                field: "data".into(),
                reason: "userData is required".into(),
            });
        }
    };
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Value, CliError> {
    serde_json::from_str(text.trim()).map_err(|e| CliError::Validation {
        field: "data".into(),
        reason: format!("must be valid JSON: {e}"),
    })
}

/// Treat a blank `--uid` like a missing one.
pub fn require_uid(uid: &str) -> Result<&str, CliError> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(CliError::Validation {
            field: "uid".into(),
            reason: "uid must not be empty".into(),
        });
    }
    Ok(uid)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    fn input(data: Option<&str>, file: Option<PathBuf>) -> DataInput {
        DataInput {
            data: data.map(str::to_owned),
            file,
        }
    }

    #[test]
    fn inline_json_is_parsed() {
        let value = read_json_input(&input(Some(r#" {"name":"Amara"} "#), None)).ok();
        assert_eq!(value, Some(json!({"name": "Amara"})));
    }

    #[test]
    fn missing_and_invalid_input_are_usage_errors() {
        assert!(matches!(
            read_json_input(&input(None, None)),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(
            read_json_input(&input(Some("{not json"), None)),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn file_input_is_read() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"seat": 12}"#).unwrap_or_else(|e| panic!("{e}"));

        let value = read_json_input(&input(None, Some(path))).ok();
        assert_eq!(value, Some(json!({"seat": 12})));
    }

    #[test]
    fn blank_uid_is_rejected() {
        assert!(require_uid("  ").is_err());
        assert_eq!(require_uid(" A ").ok(), Some("A"));
    }
}
