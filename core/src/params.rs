//! Flat string projection of structured payloads.
//!
//! # Design
//! Any `Serialize` value can become query parameters or extra headers without
//! hand-written field lists. The value is encoded to JSON, parsed back into a
//! generic `serde_json::Value` tree, checked for object shape, and each leaf is
//! turned into its textual form. No type information survives: `true` becomes
//! `"true"` and `3.14` becomes `"3.14"`.
//!
//! A `BTreeMap` keeps the output ordered by key so that assembled URLs are the
//! same on every call.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ProjectionError;

/// Project `value` to a mapping of field name to stringified field value.
///
/// Fields that encode to `null` are omitted. Nested arrays and objects are
/// kept as compact JSON text.
pub fn project<T: Serialize + ?Sized>(value: &T) -> Result<BTreeMap<String, String>, ProjectionError> {
    let encoded = serde_json::to_vec(value).map_err(|e| ProjectionError::Encode(e.to_string()))?;
    let tree: Value =
        serde_json::from_slice(&encoded).map_err(|e| ProjectionError::Encode(e.to_string()))?;

    let object = match tree {
        Value::Object(object) => object,
        other => {
            return Err(ProjectionError::NotAnObject {
                found: shape_name(&other),
            })
        }
    };

    Ok(object
        .into_iter()
        .filter_map(|(key, leaf)| stringify(leaf).map(|text| (key, text)))
        .collect())
}

fn stringify(leaf: Value) -> Option<String> {
    match leaf {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
