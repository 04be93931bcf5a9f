//! Row files: JSON arrays of objects or JSON Lines.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use nolo_core::EntityDef;
use nolo_graph::Row;
use serde_json::Value;

use crate::error::{LoadError, Result};

/// Read every row from `path`.
///
/// A file whose first non-blank character is `[` is parsed as one JSON array;
/// anything else is parsed as JSON Lines, skipping blank lines.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if text.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(&text).map_err(|e| LoadError::InvalidRow {
            path: path.to_path_buf(),
            line: e.line(),
            message: e.to_string(),
        })?;
        return values
            .into_iter()
            .enumerate()
            .map(|(i, v)| into_row(path, i + 1, v))
            .collect();
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value = serde_json::from_str(line).map_err(|e| LoadError::InvalidRow {
                path: path.to_path_buf(),
                line: i + 1,
                message: e.to_string(),
            })?;
            into_row(path, i + 1, value)
        })
        .collect()
}

fn into_row(path: &Path, line: usize, value: Value) -> Result<Row> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::InvalidRow {
            path: path.to_path_buf(),
            line,
            message: format!("expected an object, got {other}"),
        }),
    }
}

/// Drop row properties that `entity` does not declare.
///
/// The `key` field always survives, declared or not: nodes are merged on it.
pub fn filter_props(rows: Vec<Row>, entity: &EntityDef, key: &str) -> Vec<Row> {
    let known: HashSet<&str> = entity.property_names().collect();
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .filter(|(k, _)| known.contains(k.as_str()) || k == key)
                .collect()
        })
        .collect()
}
