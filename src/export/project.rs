use crate::error::{GhReportError, Result};
use crate::normalize::{merged_at_raw, str_at};
use crate::util::{first_line, short_hash};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

pub const SERIAL_COLUMN: &str = "slno";

/// Columns a caller may select, in their default order.
pub const ALLOWED_FIELDS: [&str; 10] = [
    "number",
    "title",
    "type",
    "state",
    "author",
    "created_at",
    "merged_at",
    "labels",
    "assignees",
    "html_url",
];

/// One flat output row: `slno` first, then the selected columns in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExportRow(IndexMap<String, String>);

impl ExportRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn default_fields() -> Vec<String> {
    ALLOWED_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Rejects unknown and repeated column names.
pub fn validate_fields(fields: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !ALLOWED_FIELDS.contains(&field.as_str()) {
            return Err(GhReportError::ExportInput(format!(
                "unknown field '{field}' (allowed: {})",
                ALLOWED_FIELDS.join(", ")
            )));
        }
        if !seen.insert(field.as_str()) {
            return Err(GhReportError::ExportInput(format!("field '{field}' selected more than once")));
        }
    }
    Ok(())
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn joined(record: &Value, list: &str, key: &str) -> String {
    record
        .get(list)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(key).and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn project(record: &Value, field: &str) -> String {
    match field {
        "number" => match present(record.get("number")) {
            Some(number) => scalar(Some(number)),
            None => short_hash(str_at(record, &["sha"]).unwrap_or_default()),
        },
        "title" => match str_at(record, &["title"]) {
            Some(title) => title.to_string(),
            None => first_line(str_at(record, &["commit", "message"]).unwrap_or_default()).to_string(),
        },
        "type" => scalar(record.get("type")),
        "state" => {
            if merged_at_raw(record).is_some() {
                "merged".to_string()
            } else {
                scalar(record.get("state"))
            }
        }
        "author" => str_at(record, &["user", "login"])
            .or_else(|| str_at(record, &["author", "login"]))
            .or_else(|| str_at(record, &["commit", "author", "name"]))
            .unwrap_or_default()
            .to_string(),
        "created_at" => str_at(record, &["created_at"])
            .or_else(|| str_at(record, &["commit", "author", "date"]))
            .unwrap_or_default()
            .to_string(),
        "merged_at" => merged_at_raw(record).unwrap_or_default().to_string(),
        "labels" => joined(record, "labels", "name"),
        "assignees" => joined(record, "assignees", "login"),
        "html_url" => scalar(record.get("html_url")),
        _ => String::new(),
    }
}

/// Projects an array of raw records onto the selected columns.
///
/// Fails with [`GhReportError::ExportInput`] before producing any row when
/// `records` is not an array or a field is unknown or repeated.
pub fn to_flat_rows(records: &Value, fields: &[String]) -> Result<Vec<ExportRow>> {
    validate_fields(fields)?;
    let items = records
        .as_array()
        .ok_or_else(|| GhReportError::ExportInput("records must be a JSON array".into()))?;

    Ok(items
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut row = IndexMap::with_capacity(fields.len() + 1);
            row.insert(SERIAL_COLUMN.to_string(), (i + 1).to_string());
            for field in fields {
                row.insert(field.clone(), project(record, field));
            }
            ExportRow(row)
        })
        .collect())
}
