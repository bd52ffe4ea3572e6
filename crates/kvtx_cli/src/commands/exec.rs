//! Exec command implementation.

use kvtx_core::{CoreError, Store};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of an exec run.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of entries written.
    pub written: usize,
    /// Values read back, by key.
    pub values: BTreeMap<String, String>,
}

/// Runs the exec command.
pub fn run(
    sets: &[String],
    gets: &[String],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = sets
        .iter()
        .map(|entry| parse_entry(entry))
        .collect::<Result<Vec<_>, _>>()?;

    let store = Store::new();
    let result = execute(&store, &entries, gets)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!("wrote {} entries", result.written);
            for (key, value) in &result.values {
                println!("{key}={value}");
            }
        }
    }

    Ok(())
}

/// Splits a `KEY=VALUE` argument at the first `=`.
///
/// The value may itself contain `=`; the key may be empty.
pub fn parse_entry(entry: &str) -> Result<(String, String), String> {
    entry
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {entry:?}"))
}

/// Writes `entries` in one update, then reads `gets` in one view.
pub fn execute(
    store: &Store,
    entries: &[(String, String)],
    gets: &[String],
) -> Result<ExecResult, CoreError> {
    if !entries.is_empty() {
        store.update(|tx| {
            for (key, value) in entries {
                tx.set(key.as_str(), value.as_str())?;
            }
            Ok(())
        })?;
    }

    let values = store.view(|tx| {
        Ok(gets
            .iter()
            .map(|key| (key.clone(), tx.get(key)))
            .collect::<BTreeMap<_, _>>())
    })?;

    Ok(ExecResult {
        written: entries.len(),
        values,
    })
}
