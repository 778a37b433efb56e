//! # Schema Nodes
//!
//! A [`SchemaNode`] is the rule descriptor registered for one field of a
//! validator class. The core never interprets the rules; it only needs the
//! node's kind to route messages and to build nested schemas. Engine-specific
//! constraints travel as opaque keywords.
//!
//! Nodes built through the typed constructors carry a [`Descriptor`]. Nodes
//! built with [`SchemaNode::opaque`] have none and are treated as leaves by
//! every classifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Field name → rule node. Node values are shared between a class and its
/// subclasses through `Arc`.
pub type Schema = BTreeMap<String, Arc<SchemaNode>>;

/// Kind of value a node describes.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// UTF-8 string.
    String,
    /// Any JSON number.
    Number,
    /// Integral JSON number.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// Calendar date or timestamp carried as an ISO-8601 string.
    Date,
    /// Homogeneous list of the given item node.
    Array(Arc<SchemaNode>),
    /// Object with its own field schema.
    Object(Schema),
}

/// Descriptor tree of a typed node.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    kind: SchemaKind,
}

impl Descriptor {
    /// The described kind.
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Primary type tag (`"string"`, `"array"`, `"object"`, ...).
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            SchemaKind::String | SchemaKind::Date => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array(_) => "array",
            SchemaKind::Object(_) => "object",
        }
    }

    /// Refining subtype tag. Only dates carry one.
    pub fn subtype_tag(&self) -> Option<&'static str> {
        match self.kind {
            SchemaKind::Date => Some("date"),
            _ => None,
        }
    }
}

/// Rule descriptor for a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    descriptor: Option<Descriptor>,
    optional: bool,
    keywords: Map<String, Value>,
}

impl SchemaNode {
    fn typed(kind: SchemaKind) -> Self {
        Self {
            descriptor: Some(Descriptor { kind }),
            optional: false,
            keywords: Map::new(),
        }
    }

    pub fn string() -> Self {
        Self::typed(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::typed(SchemaKind::Number)
    }

    pub fn integer() -> Self {
        Self::typed(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::typed(SchemaKind::Boolean)
    }

    pub fn date() -> Self {
        Self::typed(SchemaKind::Date)
    }

    /// A list whose every element must satisfy `item`.
    pub fn array(item: SchemaNode) -> Self {
        Self::typed(SchemaKind::Array(Arc::new(item)))
    }

    /// An object validated against `schema`.
    pub fn object(schema: Schema) -> Self {
        Self::typed(SchemaKind::Object(schema))
    }

    /// A node with no descriptor tree, carrying only engine keywords.
    pub fn opaque(keywords: Map<String, Value>) -> Self {
        Self {
            descriptor: None,
            optional: false,
            keywords,
        }
    }

    /// Mark the field as optional. Fields are required by default.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach an engine keyword (e.g. `minLength`, `maximum`, `enum`).
    pub fn rule(mut self, keyword: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(keyword.into(), value.into());
        self
    }

    /// The descriptor tree, if the node was built from a typed constructor.
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    /// Shorthand for `descriptor().map(Descriptor::kind)`.
    pub fn kind(&self) -> Option<&SchemaKind> {
        self.descriptor.as_ref().map(Descriptor::kind)
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Engine keywords attached to this node.
    pub fn keywords(&self) -> &Map<String, Value> {
        &self.keywords
    }
}
