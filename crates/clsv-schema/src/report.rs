//! # Violation Reporting
//!
//! Maps `jsonschema` violations onto [`FieldError`]s addressed the way bag
//! messages are keyed: dotted field paths and rule names.
//!
//! ## Message lookup
//!
//! For a violation of `rule` at `field`, the first hit wins:
//!
//! 1. `"<field>.<rule>"` (`tags.0.minLength`)
//! 2. the same key with every index replaced by `*` (`tags.*.minLength`)
//! 3. the bare rule name (`minLength`)
//! 4. the engine's own description

use clsv_core::{is_date, FieldError, Messages, Schema, SchemaKind, SchemaNode};
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;

/// Rule name reported for any failed constraint on a date field.
pub const DATE_RULE: &str = "date";

pub(crate) fn to_field_error(
    error: &ValidationError<'_>,
    schema: &Schema,
    messages: &Messages,
) -> FieldError {
    let mut path = pointer_segments(&error.instance_path.to_string());
    let mut rule = last_segment(&error.schema_path.to_string());

    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            path.push(name.to_string());
        }
        rule = "required".to_string();
    }

    if matches!(rule.as_str(), "type" | "pattern") && node_at(schema, &path).is_some_and(is_date) {
        rule = DATE_RULE.to_string();
    }

    let field = path.join(".");
    let message = lookup_message(messages, &field, &rule)
        .map(str::to_owned)
        .unwrap_or_else(|| error.to_string());

    FieldError {
        field,
        rule,
        message,
    }
}

/// Resolve the message for `rule` at `field`.
pub fn lookup_message<'a>(messages: &'a Messages, field: &str, rule: &str) -> Option<&'a str> {
    if !field.is_empty() {
        if let Some(text) = messages.get(&format!("{field}.{rule}")) {
            return Some(text);
        }
        if let Some(pattern) = wildcard(field) {
            if let Some(text) = messages.get(&format!("{pattern}.{rule}")) {
                return Some(text);
            }
        }
    }
    messages.get(rule).map(String::as_str)
}

/// Replace index segments with `*`. `None` when the path has no index.
fn wildcard(field: &str) -> Option<String> {
    let mut replaced = false;
    let segments: Vec<&str> = field
        .split('.')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                replaced = true;
                "*"
            } else {
                segment
            }
        })
        .collect();
    replaced.then(|| segments.join("."))
}

/// Split a JSON Pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn last_segment(pointer: &str) -> String {
    pointer_segments(pointer).pop().unwrap_or_default()
}

/// Find the node that governs the value at `path`.
fn node_at<'a>(schema: &'a Schema, path: &[String]) -> Option<&'a SchemaNode> {
    let (first, mut rest) = path.split_first()?;
    let mut node: &SchemaNode = schema.get(first)?;
    while let Some((segment, tail)) = rest.split_first() {
        node = match node.kind()? {
            SchemaKind::Array(item) => item.as_ref(),
            SchemaKind::Object(fields) => fields.get(segment)?.as_ref(),
            _ => return None,
        };
        rest = tail;
    }
    Some(node)
}
