//! Permissive reads over loaded YAML plan documents.
//!
//! Missing keys and unexpected shapes read as "nothing there" rather than as
//! errors; the documents' schema belongs to the updaters, not to this crate.

use crate::error::{CheckError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

pub fn load(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).map_err(|e| CheckError::Document {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&raw).map_err(|e| CheckError::Document {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Follows a dotted key path (`time_horizons.short_term.goals`) through nested mappings.
pub fn lookup<'a>(doc: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .filter(|key| !key.is_empty())
        .try_fold(doc, |current, key| current.as_mapping()?.get(key))
}

pub fn str_at<'a>(doc: &'a Value, dotted: &str) -> Option<&'a str> {
    lookup(doc, dotted).and_then(Value::as_str)
}

/// The sequence at `dotted`, or an empty slice when absent or not a sequence.
pub fn seq_at<'a>(doc: &'a Value, dotted: &str) -> &'a [Value] {
    lookup(doc, dotted)
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn contains_str(items: &[Value], needle: &str) -> bool {
    items.iter().any(|item| item.as_str() == Some(needle))
}

/// Whether any mapping in `items` has `id: <id>`.
pub fn contains_id(items: &[Value], id: &str) -> bool {
    items
        .iter()
        .any(|item| item.get("id").and_then(Value::as_str) == Some(id))
}
