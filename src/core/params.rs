//! Argument extraction for tool calls.
//!
//! Tools receive a plain `JsonObject` (no schemars-generated types, following
//! the gateway convention of keeping the wire surface loose). These helpers
//! turn missing or ill-typed fields into `Validation` errors so invalid input
//! never reaches the network.

use rmcp::model::JsonObject;
use serde_json::Value;

use crate::core::error::AdoError;

fn missing(key: &str) -> AdoError {
    AdoError::Validation(format!("missing required field: {key}"))
}

pub fn required_str(args: &JsonObject, key: &str) -> Result<String, AdoError> {
    optional_str(args, key)?.ok_or_else(|| missing(key))
}

pub fn optional_str(args: &JsonObject, key: &str) -> Result<Option<String>, AdoError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AdoError::Validation(format!("field {key} must be a string"))),
    }
}

pub fn required_i64(args: &JsonObject, key: &str) -> Result<i64, AdoError> {
    optional_i64(args, key)?.ok_or_else(|| missing(key))
}

pub fn optional_i64(args: &JsonObject, key: &str) -> Result<Option<i64>, AdoError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            AdoError::Validation(format!("field {key} must be an integer"))
        }),
    }
}

/// Required numeric identifier; zero and negative values are rejected locally.
pub fn required_id(args: &JsonObject, key: &str) -> Result<i64, AdoError> {
    let id = required_i64(args, key)?;
    if id <= 0 {
        return Err(AdoError::Validation(format!(
            "field {key} must be a positive integer"
        )));
    }
    Ok(id)
}

/// Optional positive count (`$top`/`$skip`-style arguments).
pub fn optional_count(args: &JsonObject, key: &str) -> Result<Option<u32>, AdoError> {
    match optional_i64(args, key)? {
        None => Ok(None),
        Some(v) if v >= 0 => Ok(Some(v as u32)),
        Some(_) => Err(AdoError::Validation(format!(
            "field {key} must be a non-negative integer"
        ))),
    }
}

/// Optional numeric identifier; zero and negative values are rejected locally.
pub fn optional_id(args: &JsonObject, key: &str) -> Result<Option<i64>, AdoError> {
    match optional_i64(args, key)? {
        None => Ok(None),
        Some(v) if v > 0 => Ok(Some(v)),
        Some(_) => Err(AdoError::Validation(format!(
            "field {key} must be a positive integer"
        ))),
    }
}

/// Required non-empty array of positive numeric identifiers.
pub fn required_id_list(args: &JsonObject, key: &str) -> Result<Vec<i64>, AdoError> {
    let items = match args.get(key) {
        None | Some(Value::Null) => return Err(missing(key)),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AdoError::Validation(format!(
                "field {key} must be an array of positive integers"
            )))
        }
    };
    let ids = items
        .iter()
        .map(|v| v.as_i64().filter(|id| *id > 0))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            AdoError::Validation(format!("field {key} must be an array of positive integers"))
        })?;
    if ids.is_empty() {
        return Err(AdoError::Validation(format!(
            "field {key} must contain at least one id"
        )));
    }
    Ok(ids)
}

pub fn optional_bool(args: &JsonObject, key: &str) -> Result<Option<bool>, AdoError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(AdoError::Validation(format!("field {key} must be a boolean"))),
    }
}

pub fn optional_str_list(args: &JsonObject, key: &str) -> Result<Option<Vec<String>>, AdoError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    AdoError::Validation(format!("field {key} must be an array of strings"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(AdoError::Validation(format!(
            "field {key} must be an array of strings"
        ))),
    }
}

pub fn required_object(args: &JsonObject, key: &str) -> Result<JsonObject, AdoError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(missing(key)),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(AdoError::Validation(format!("field {key} must be an object"))),
    }
}

/// Validate a value against a closed set of accepted spellings.
pub fn one_of(key: &str, value: &str, accepted: &[&str]) -> Result<(), AdoError> {
    if accepted.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        Ok(())
    } else {
        Err(AdoError::Validation(format!(
            "field {key} must be one of: {}",
            accepted.join(", ")
        )))
    }
}
