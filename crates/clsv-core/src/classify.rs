//! Schema kind predicates used when composing nested and array fields.

use crate::node::{SchemaKind, SchemaNode};

/// True iff the node's descriptor describes an array.
pub fn is_array(node: &SchemaNode) -> bool {
    matches!(node.kind(), Some(SchemaKind::Array(_)))
}

/// True iff the node's descriptor describes a date.
pub fn is_date(node: &SchemaNode) -> bool {
    matches!(node.kind(), Some(SchemaKind::Date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn array_node_is_array() {
        let node = SchemaNode::array(SchemaNode::integer());
        assert!(is_array(&node));
        assert!(!is_date(&node));
    }

    #[test]
    fn date_node_is_date() {
        let node = SchemaNode::date().optional();
        assert!(is_date(&node));
        assert!(!is_array(&node));
    }

    #[test]
    fn array_of_dates_is_only_an_array() {
        let node = SchemaNode::array(SchemaNode::date());
        assert!(is_array(&node));
        assert!(!is_date(&node));
    }

    #[test]
    fn scalars_are_neither() {
        for node in [
            SchemaNode::string(),
            SchemaNode::number(),
            SchemaNode::boolean(),
            SchemaNode::object(Default::default()),
        ] {
            assert!(!is_array(&node));
            assert!(!is_date(&node));
        }
    }

    #[test]
    fn opaque_node_is_neither_even_with_type_keyword() {
        let mut keywords = Map::new();
        keywords.insert("type".into(), json!("array"));
        let node = SchemaNode::opaque(keywords);
        assert!(!is_array(&node));
        assert!(!is_date(&node));
    }
}
