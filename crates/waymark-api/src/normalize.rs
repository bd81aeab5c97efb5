//! Server validation-error normalization.
//!
//! Backend validation failures arrive as JSON documents whose shape is not
//! known ahead of time: DRF-style `detail` strings, per-field message
//! arrays, or arbitrarily nested objects. This module reduces any of them
//! to a single human-readable string.

use crate::error::UNEXPECTED_ERROR;
use serde_json::Value;

/// Reduce a non-2xx response body to one human-readable string.
pub fn normalize_error_body(body: &Value) -> String {
    let Some(map) = body.as_object() else {
        return UNEXPECTED_ERROR.to_string();
    };

    if let Some(message) = map.get("detail").and_then(join_messages) {
        return message;
    }
    if let Some(message) = map.get("non_field_errors").and_then(join_messages) {
        return message;
    }

    let mut lines = Vec::new();
    for (field, value) in map {
        collect_lines(&title_case(field), value, &mut lines);
    }

    if lines.is_empty() {
        UNEXPECTED_ERROR.to_string()
    } else {
        lines.join("\n")
    }
}

/// Join a string or an array of strings with `", "`.
fn join_messages(value: &Value) -> Option<String> {
    match value {
        Value::String(message) => Some(message.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

/// Walk a field value, emitting one line per leaf with a dotted,
/// Title-Cased path.
fn collect_lines(path: &str, value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if !parts.is_empty() {
                lines.push(format!("{path}: {}", parts.join(", ")));
            }
        }
        Value::Object(map) => {
            for (field, nested) in map {
                collect_lines(&format!("{path}.{}", title_case(field)), nested, lines);
            }
        }
        Value::String(message) => lines.push(format!("{path}: {message}")),
        Value::Number(number) => lines.push(format!("{path}: {number}")),
        Value::Bool(flag) => lines.push(format!("{path}: {flag}")),
        Value::Null => {}
    }
}

/// `snake_case` → `Title Case`.
fn title_case(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
