//! # Field Declarations
//!
//! Declaration-time access to a class's own bag. [`Validatable::declare`]
//! receives a [`FieldDeclarations`] on first resolution, and
//! [`BagRegistry::update`] hands one out for later registrations.
//!
//! Messages passed alongside a field are qualified with the field's name
//! before they are merged into the bag. Array fields use the `.*.`
//! separator so engines can match every element.
//!
//! [`Validatable::declare`]: crate::Validatable::declare

use std::sync::Arc;

use crate::bag::ValidatorBag;
use crate::class::Validatable;
use crate::classify::is_array;
use crate::messages::{transform_messages, Messages};
use crate::node::{Schema, SchemaNode};
use crate::registry::BagRegistry;

/// Mutable view over one class's bag during declaration.
pub struct FieldDeclarations<'a> {
    registry: &'a BagRegistry,
    bag: &'a mut ValidatorBag,
}

impl<'a> FieldDeclarations<'a> {
    pub(crate) fn new(registry: &'a BagRegistry, bag: &'a mut ValidatorBag) -> Self {
        Self { registry, bag }
    }

    /// Register (or override) a field.
    pub fn field(&mut self, name: impl Into<String>, node: SchemaNode) -> &mut Self {
        self.bag.schema.insert(name.into(), Arc::new(node));
        self
    }

    /// Register a field together with its per-rule messages.
    pub fn field_with_messages(
        &mut self,
        name: impl Into<String>,
        node: SchemaNode,
        messages: &Messages,
    ) -> &mut Self {
        let name = name.into();
        let qualified = transform_messages(&name, messages, is_array(&node));
        self.bag.messages.extend(qualified);
        self.field(name, node)
    }

    /// Register a field validated by another class's schema. The nested
    /// class's messages are carried over under the field's path.
    pub fn nested<T: Validatable>(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        let inner = self.registry.resolve::<T>();
        let qualified = transform_messages(&name, &inner.messages, false);
        self.bag.messages.extend(qualified);
        self.field(name, SchemaNode::object(inner.schema.clone()))
    }

    /// Register a list field whose elements are validated by another class.
    pub fn nested_array<T: Validatable>(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        let inner = self.registry.resolve::<T>();
        let qualified = transform_messages(&name, &inner.messages, true);
        self.bag.messages.extend(qualified);
        self.field(
            name,
            SchemaNode::array(SchemaNode::object(inner.schema.clone())),
        )
    }

    /// Register a fully qualified message key.
    pub fn message(&mut self, key: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.bag.messages.insert(key.into(), text.into());
        self
    }

    /// Drop an inherited field. Messages are left in place.
    pub fn remove(&mut self, name: &str) -> Option<Arc<SchemaNode>> {
        self.bag.schema.remove(name)
    }

    /// Fields declared so far, inherited ones included.
    pub fn schema(&self) -> &Schema {
        &self.bag.schema
    }

    /// Messages declared so far, inherited ones included.
    pub fn messages(&self) -> &Messages {
        &self.bag.messages
    }
}
