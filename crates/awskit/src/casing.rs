//! Key-case normalization for service documents.
//!
//! AWS returns camelCase keys; callers get snake_case. Only object keys
//! are rewritten; string values pass through untouched.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// A capital that starts a lower-case run, preceded by anything.
static FIRST_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(.)([A-Z][a-z]+)").expect("static regex"));

/// A capital preceded by a lower-case letter or digit.
static ALL_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([a-z0-9])([A-Z])").expect("static regex"));

/// Convert one camelCase (or PascalCase) name to snake_case.
///
/// Acronyms stay together: `HTTPEndpoint` becomes `http_endpoint`.
pub fn camel_to_snake(name: &str) -> String {
    let first = FIRST_CAP.replace_all(name, "${1}_${2}");
    ALL_CAP.replace_all(&first, "${1}_${2}").to_lowercase()
}

/// Recursively rewrite every object key in `value` to snake_case.
pub fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camel_to_snake(&k), snake_case_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}
