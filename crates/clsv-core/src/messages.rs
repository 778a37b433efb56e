//! # Message Key Transforms
//!
//! Validator classes declare messages per rule (`required`, `minLength`).
//! Engines look messages up by field path, so before a field's messages are
//! merged into a bag they are qualified with the field name. Array fields
//! address their elements through a `*` segment.

use std::collections::BTreeMap;

/// Message key → message text.
pub type Messages = BTreeMap<String, String>;

/// Qualify every rule key in `messages` with `field`.
///
/// `{required: "..."}` becomes `{"<field>.required": "..."}`, or
/// `{"<field>.*.required": "..."}` when `is_array` is set.
pub fn transform_messages(field: &str, messages: &Messages, is_array: bool) -> Messages {
    let separator = if is_array { ".*." } else { "." };
    messages
        .iter()
        .map(|(rule, text)| (format!("{field}{separator}{rule}"), text.clone()))
        .collect()
}
