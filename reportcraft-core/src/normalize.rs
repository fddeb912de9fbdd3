//! Permissive payload normalization
//!
//! Upstream automation tools deliver the same logical input in several
//! shapes: structured objects, JSON-encoded strings, single-element wrapper
//! arrays, or arrays of JSON strings. Every function here is total. Shape
//! mismatches degrade to an empty record or list, never an error, so the
//! remaining tables still render. Unwrapping is bounded at two levels: one
//! single-element unwrap plus one JSON-string parse.

use serde_json::{Map, Value};

/// One row's worth of data: field name -> scalar value.
pub type Record = Map<String, Value>;

/// Parse a string as JSON only if it plausibly is JSON (after trimming it
/// starts with `{` or `[`).
pub fn try_parse_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Reduce a single-record input to one record.
///
/// Tolerated shapes: a plain object, a single-element array wrapping one, a
/// JSON-encoded string of either, and a JSON-encoded string of a
/// single-element array. Anything else becomes an empty record so the other
/// tables still render.
pub fn normalize_record(value: Option<&Value>) -> Record {
    let mut v = match value {
        Some(v) => v.clone(),
        None => return Record::new(),
    };

    if let Value::Array(items) = &v
        && items.len() == 1
    {
        v = items[0].clone();
    }

    if let Value::String(s) = &v
        && let Some(parsed) = try_parse_json(s)
    {
        v = parsed;
    }

    if let Value::Array(items) = &v
        && items.len() == 1
        && items[0].is_object()
    {
        v = items[0].clone();
    }

    match v {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Reduce a multi-record input to an ordered list of records.
///
/// Tolerated shapes: a JSON-encoded string of a list, a list, and a
/// single-element list wrapping a JSON-encoded list. Elements that are not
/// key-value objects after a best-effort parse are dropped silently; a
/// malformed row never takes the whole list down.
pub fn normalize_records(value: Option<&Value>) -> Vec<Record> {
    let Some(v) = value else {
        return Vec::new();
    };

    if let Value::String(s) = v {
        if let Some(Value::Array(items)) = try_parse_json(s) {
            return collect_records(items);
        }
        return Vec::new();
    }

    if let Value::Array(items) = v {
        if items.len() == 1
            && let Value::String(s) = &items[0]
            && let Some(Value::Array(inner)) = try_parse_json(s)
        {
            return collect_records(inner);
        }

        return collect_records(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => try_parse_json(s).unwrap_or_else(|| item.clone()),
                    _ => item.clone(),
                })
                .collect(),
        );
    }

    Vec::new()
}

fn collect_records(items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
