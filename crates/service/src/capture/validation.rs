//! Per-action payload validation.
//!
//! Issues are human-readable strings; an empty list means the payload is
//! acceptable.

use actionlog_core::ActionId;
use actionlog_core::constants::MIN_REFRAMES;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Validates a parsed candidate payload for `action`.
#[must_use]
pub fn validate(action: ActionId, payload: &Value) -> Vec<String> {
    let Some(obj) = payload.as_object() else {
        return vec!["payload must be a JSON object".to_owned()];
    };
    let mut issues = Vec::new();
    match action {
        ActionId::Knowledge => {
            require(obj, "topic", &mut issues);
            require(obj, "coreQuestion", &mut issues);
            if obj.get("notes").is_some_and(|n| !n.is_null() && !n.is_string()) {
                issues.push("notes must be a string".to_owned());
            }
        },
        ActionId::Household => {
            require(obj, "observation", &mut issues);
            require(obj, "analysis", &mut issues);
        },
        ActionId::Reframe => {
            require(obj, "problem", &mut issues);
            let empty = Vec::new();
            let reframes = obj.get("reframes").and_then(Value::as_array).unwrap_or(&empty);
            if reframes.len() < MIN_REFRAMES {
                issues.push(format!("reframes needs at least {MIN_REFRAMES} entries"));
            }
            if !reframes.iter().all(|r| r.as_str().is_some_and(|s| !s.trim().is_empty())) {
                issues.push("each reframe must be a non-empty string".to_owned());
            }
        },
        ActionId::Weight => {
            let date_ok = obj
                .get("date")
                .and_then(Value::as_str)
                .is_some_and(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").is_ok());
            if !date_ok {
                issues.push("date must be YYYY-MM-DD".to_owned());
            }
            let weight_ok = obj
                .get("weightKg")
                .and_then(Value::as_f64)
                .is_some_and(|w| w.is_finite() && w > 0.0);
            if !weight_ok {
                issues.push("weightKg must be a positive number".to_owned());
            }
        },
    }
    issues
}

fn require(obj: &Map<String, Value>, key: &str, issues: &mut Vec<String>) {
    if !obj.get(key).is_some_and(has_text) {
        issues.push(format!("{key} is required"));
    }
}

/// Whether a value is truthy and coerces to non-blank text, so `0`, `[]`
/// and `[""]` are all missing.
pub(crate) fn has_text(value: &Value) -> bool {
    let truthy = match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    truthy && !coerced_text(value).trim().is_empty()
}

/// String coercion with script semantics: arrays join their elements with
/// commas and nulls inside them become empty.
fn coerced_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(coerced_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

/// Text form of a scalar field, as a user would see it.
pub(crate) fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(other) => other.to_string(),
    }
}
