//! Structural JSON equality with decimal number comparison.
//!
//! Objects compare by key set regardless of order, arrays element by
//! element in order. Numbers compare as decimals so `41.6` equals `41.60`
//! and `1e3` equals `1000`.

use std::collections::BTreeSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use covenant_domain::{Diff, NodePath};
use serde_json::{Number, Value};

/// Placeholder rendered for a node that does not exist on one side.
pub const MISSING: &str = "<missing>";

const PREVIEW_LIMIT: usize = 120;

/// Returns the first difference between `expected` and `actual`, reported
/// at the deepest path where they diverge.
///
/// Object keys are visited in sorted order, so the result is deterministic.
#[must_use]
pub fn first_difference(expected: &Value, actual: &Value, path: &NodePath) -> Option<Diff> {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            let keys: BTreeSet<&String> = expected_map.keys().chain(actual_map.keys()).collect();
            keys.into_iter().find_map(|key| {
                let child = path.key(key.as_str());
                match (expected_map.get(key), actual_map.get(key)) {
                    (Some(e), Some(a)) => first_difference(e, a, &child),
                    (Some(e), None) => Some(Diff::new(child, render(e), MISSING, "missing key")),
                    (None, Some(a)) => Some(Diff::new(child, MISSING, render(a), "unexpected key")),
                    (None, None) => None,
                }
            })
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => expected_items
            .iter()
            .zip(actual_items)
            .enumerate()
            .find_map(|(i, (e, a))| first_difference(e, a, &path.index(i)))
            .or_else(|| {
                (expected_items.len() != actual_items.len()).then(|| {
                    Diff::new(
                        path.clone(),
                        format!("array of {} elements", expected_items.len()),
                        format!("array of {} elements", actual_items.len()),
                        "array length differs",
                    )
                })
            }),
        (Value::Number(e), Value::Number(a)) => (!numbers_equal(e, a))
            .then(|| Diff::new(path.clone(), e.to_string(), a.to_string(), "value differs")),
        (e, a) if type_name(e) != type_name(a) => Some(Diff::new(
            path.clone(),
            render(e),
            render(a),
            format!("expected {}, found {}", type_name(e), type_name(a)),
        )),
        (e, a) => (e != a).then(|| Diff::new(path.clone(), render(e), render(a), "value differs")),
    }
}

/// Compares two JSON numbers by decimal value.
#[must_use]
pub fn numbers_equal(expected: &Number, actual: &Number) -> bool {
    match (
        BigDecimal::from_str(&expected.to_string()),
        BigDecimal::from_str(&actual.to_string()),
    ) {
        (Ok(e), Ok(a)) => e == a,
        _ => expected == actual,
    }
}

/// JSON type name used in diff messages.
#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact rendering of a value, shortened for long documents.
#[must_use]
pub fn render(value: &Value) -> String {
    preview(&value.to_string())
}

/// Shortens text to a readable preview on a char boundary.
#[must_use]
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
