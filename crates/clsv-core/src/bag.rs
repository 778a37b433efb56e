//! The composed rule-set of a validator class.

use crate::messages::Messages;
use crate::node::Schema;

/// Resolved `{key, schema, messages}` triple for one class.
///
/// `key` identifies the originating class for the lifetime of the registry
/// that produced the bag. The empty bag has an empty key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorBag {
    pub key: String,
    pub schema: Schema,
    pub messages: Messages,
}

impl ValidatorBag {
    /// The canonical bag of a target without validator ancestry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start a child bag from `parent`.
    ///
    /// Both maps are copied; the nodes inside are shared, so later inserts on
    /// either side stay invisible to the other.
    pub fn inherit(parent: &ValidatorBag, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            schema: parent.schema.clone(),
            messages: parent.messages.clone(),
        }
    }
}
