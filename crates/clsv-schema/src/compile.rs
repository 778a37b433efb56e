//! # Bag → JSON Schema Compilation
//!
//! Turns a bag's field schema into a Draft 2020-12 document. Each field
//! becomes a `properties` entry; fields not marked optional are listed in
//! `required`. Typed nodes contribute their `type` (plus `items` or nested
//! `properties`), dates are strings constrained by [`DATE_PATTERN`], and the
//! node's own keywords are merged last so they can refine or override the
//! generated ones. Opaque nodes contribute only their keywords.

use clsv_core::{Schema, SchemaKind, SchemaNode};
use serde_json::{json, Map, Value};

use crate::engine::EngineOptions;

/// ISO-8601 calendar date with an optional time and offset.
pub const DATE_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:\d{2})?)?$";

/// Compile a field schema into an object schema document.
pub fn compile_schema(schema: &Schema, options: &EngineOptions) -> Value {
    Value::Object(object_schema(schema, options))
}

/// Compile a single node.
pub fn compile_node(node: &SchemaNode, options: &EngineOptions) -> Value {
    let mut out = match node.kind() {
        None => Map::new(),
        Some(SchemaKind::Array(item)) => {
            let mut map = Map::new();
            map.insert("type".into(), json!("array"));
            map.insert("items".into(), compile_node(item, options));
            map
        }
        Some(SchemaKind::Object(fields)) => object_schema(fields, options),
        Some(SchemaKind::Date) => {
            let mut map = Map::new();
            map.insert("type".into(), json!("string"));
            map.insert("pattern".into(), json!(DATE_PATTERN));
            map
        }
        Some(_) => {
            let mut map = Map::new();
            if let Some(descriptor) = node.descriptor() {
                map.insert("type".into(), json!(descriptor.type_tag()));
            }
            map
        }
    };

    for (keyword, value) in node.keywords() {
        out.insert(keyword.clone(), value.clone());
    }
    Value::Object(out)
}

fn object_schema(schema: &Schema, options: &EngineOptions) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (name, node) in schema {
        properties.insert(name.clone(), compile_node(node, options));
        if !node.is_optional() {
            required.push(Value::String(name.clone()));
        }
    }

    let mut out = Map::new();
    out.insert("type".into(), json!("object"));
    out.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        out.insert("required".into(), Value::Array(required));
    }
    if !options.allow_unknown_fields {
        out.insert("additionalProperties".into(), json!(false));
    }
    out
}
