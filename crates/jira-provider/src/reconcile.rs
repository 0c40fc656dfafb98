//! Custom field reconciliation.
//!
//! Jira returns structured custom fields with extra keys (ids, `self` links,
//! avatar urls) that an operator never declared. Reading them back verbatim
//! would show permanent drift, so the observed value is narrowed down to the
//! shape of the declared one before it is written into state.
//!
//! Declared values are strings. A string that parses as JSON is treated as a
//! shape and the observed value is projected onto it. Anything else is a
//! literal and the observed scalar is rendered back into the same literal
//! form. Bare numbers and booleans count as literals while Jira reports a
//! scalar for them, so `"42"` against `3.5` reads back as `"3.500000"`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ReconcileError;

/// Number of decimals used when rendering an observed float as a literal.
pub const FLOAT_PRECISION: usize = 6;

/// Reconcile declared custom field values against what Jira reports.
///
/// Only fields present in both maps appear in the result. Fields that Jira
/// did not return are left for the caller to keep as they were.
///
/// # Errors
/// Fails on the first field that cannot be reconciled; nothing is returned
/// for the other fields in that case.
pub fn reconcile(
    declared: &BTreeMap<String, String>,
    observed: &Map<String, Value>,
) -> Result<BTreeMap<String, String>, ReconcileError> {
    let mut reconciled = BTreeMap::new();

    for (name, declared_value) in declared {
        let Some(observed_value) = observed.get(name) else {
            debug!(field = %name, "Field not reported by Jira, keeping declared value");
            continue;
        };

        let value = reconcile_field(name, declared_value, observed_value)?;
        reconciled.insert(name.clone(), value);
    }

    Ok(reconciled)
}

/// Reconcile a single declared value against its observed counterpart.
///
/// # Errors
/// See [`reconcile`].
pub fn reconcile_field(
    name: &str,
    declared: &str,
    observed: &Value,
) -> Result<String, ReconcileError> {
    let shape = match serde_json::from_str::<Value>(declared) {
        // Bare numbers and booleans read like literals ("42", "true") as long
        // as Jira reports a scalar too.
        Ok(Value::Number(_) | Value::Bool(_)) if is_scalar(observed) => {
            return render_scalar(name, observed);
        }
        Ok(shape) => shape,
        Err(_) => return render_scalar(name, observed),
    };

    let projected = project_keys(&shape, observed);
    if projected == shape {
        return Ok(declared.to_string());
    }

    serde_json::to_string(&projected).map_err(|source| ReconcileError::MalformedDeclaredValue {
        field: name.to_string(),
        source,
    })
}

/// Narrow `value` down to the keys and indices present in `shape`.
///
/// Objects keep exactly the keys of `shape`; keys Jira did not report become
/// `null`. Arrays are truncated to the shorter of the two. Where the kinds
/// differ, or `shape` is a scalar, `value` is returned untouched.
#[must_use]
pub fn project_keys(shape: &Value, value: &Value) -> Value {
    match (shape, value) {
        (Value::Object(shape_map), Value::Object(value_map)) => {
            let projected = shape_map
                .iter()
                .map(|(key, sub_shape)| {
                    let sub_value = match value_map.get(key) {
                        Some(sub_value) => project_keys(sub_shape, sub_value),
                        None => {
                            debug!(key = %key, "Declared key missing from observed value");
                            Value::Null
                        }
                    };
                    (key.clone(), sub_value)
                })
                .collect::<Map<_, _>>();
            Value::Object(projected)
        }
        (Value::Array(shape_items), Value::Array(value_items)) => Value::Array(
            shape_items
                .iter()
                .zip(value_items)
                .map(|(sub_shape, sub_value)| project_keys(sub_shape, sub_value))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Render an observed scalar the way a literal declared value is written.
///
/// Integers print as plain digits and floats in fixed point with
/// [`FLOAT_PRECISION`] decimals.
///
/// # Errors
/// Objects, arrays and `null` have no literal form and are rejected with
/// [`ReconcileError::UnsupportedScalarType`].
pub fn render_scalar(name: &str, observed: &Value) -> Result<String, ReconcileError> {
    let unsupported = |kind| ReconcileError::UnsupportedScalarType {
        field: name.to_string(),
        kind,
    };

    match observed {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                match n.as_f64() {
                    Some(f) => Ok(format!("{:.*}", FLOAT_PRECISION, f)),
                    None => Ok(n.to_string()),
                }
            }
        }
        Value::Object(_) => Err(unsupported("object")),
        Value::Array(_) => Err(unsupported("array")),
        Value::Null => Err(unsupported("null")),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Bool(_) | Value::Number(_))
}

/// Decode a declared value into the JSON sent to Jira on create and update.
///
/// Valid JSON is sent as the decoded document, anything else as a string.
#[must_use]
pub fn decode_declared(declared: &str) -> Value {
    serde_json::from_str(declared).unwrap_or_else(|_| Value::String(declared.to_string()))
}

/// Decode every declared custom field for a request payload.
#[must_use]
pub fn decode_declared_fields(declared: &BTreeMap<String, String>) -> Map<String, Value> {
    declared
        .iter()
        .map(|(name, value)| (name.clone(), decode_declared(value)))
        .collect()
}
