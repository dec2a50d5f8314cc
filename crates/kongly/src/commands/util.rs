//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use kongly_core::{Attributes, decode_assignments};
use serde_json::Value;

use crate::cli::WriteArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Merge `--from-file` and `--set` into one attribute map.
///
/// `--set` keys replace the file's top-level keys of the same name.
pub fn build_attributes(args: &WriteArgs) -> Result<Attributes, CliError> {
    let mut attributes = match args.from_file {
        Some(ref path) => match read_json_file(path)? {
            Value::Object(map) => map,
            _ => {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected a JSON object".into(),
                });
            }
        },
        None => Attributes::new(),
    };

    let assigned = decode_assignments(args.set.iter().map(String::as_str))
        .map_err(kongly_core::CoreError::from)?;
    attributes.extend(assigned);

    if attributes.is_empty() {
        return Err(CliError::Validation {
            field: "attributes".into(),
            reason: "nothing to send; use --set KEY=VALUE or --from-file".into(),
        });
    }
    Ok(attributes)
}

/// Render a JSON value for a table cell.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".into(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cell(Some(v)))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}
