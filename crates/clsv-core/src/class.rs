//! # Validator Classes
//!
//! A type opts into bag composition by implementing [`Validatable`]. The
//! trait names the class, points at its single parent (if any), and declares
//! the fields the class adds on top of what it inherits.
//!
//! Types that do not implement the trait are plain data holders; callers
//! address them as [`Target::Plain`] and receive the empty bag.
//!
//! ```ignore
//! struct Person;
//! impl Validatable for Person {
//!     const NAME: &'static str = "Person";
//!     fn declare(fields: &mut FieldDeclarations<'_>) {
//!         fields.field("name", SchemaNode::string());
//!     }
//! }
//!
//! struct Employee;
//! impl Validatable for Employee {
//!     const NAME: &'static str = "Employee";
//!     fn parent() -> Option<ValidatorClass> {
//!         Some(ValidatorClass::of::<Person>())
//!     }
//! }
//! ```

use std::any::TypeId;
use std::fmt;

use crate::declare::FieldDeclarations;

/// Capability marker for types that own a validator bag.
pub trait Validatable: 'static {
    /// Declared class name. Used in bag keys and metadata identifiers.
    const NAME: &'static str;

    /// The immediate parent class. `None` for a root class.
    fn parent() -> Option<ValidatorClass> {
        None
    }

    /// Register this class's own fields. Runs once, on first resolution,
    /// after the parent's fields have been copied in.
    fn declare(_fields: &mut FieldDeclarations<'_>) {}
}

/// Process-stable identity of a validator class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(TypeId);

impl ClassId {
    pub fn of<T: Validatable>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// Runtime handle to a [`Validatable`] type.
#[derive(Clone, Copy)]
pub struct ValidatorClass {
    id: ClassId,
    name: &'static str,
    parent: fn() -> Option<ValidatorClass>,
    declare: fn(&mut FieldDeclarations<'_>),
}

impl ValidatorClass {
    /// Handle for `T`.
    pub fn of<T: Validatable>() -> Self {
        Self {
            id: ClassId::of::<T>(),
            name: T::NAME,
            parent: T::parent,
            declare: T::declare,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The immediate parent class, if any.
    pub fn parent(&self) -> Option<ValidatorClass> {
        (self.parent)()
    }

    /// Identifier of the slot that holds this class's bag:
    /// `"@<ClassName>.classValidatorBag"`.
    pub fn metadata_key(&self) -> String {
        format!("@{}.classValidatorBag", self.name)
    }

    pub(crate) fn declare(&self, fields: &mut FieldDeclarations<'_>) {
        (self.declare)(fields)
    }
}

impl PartialEq for ValidatorClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValidatorClass {}

impl fmt::Debug for ValidatorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ValidatorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Something a bag can be resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A data holder with no validator ancestry.
    Plain,
    /// A validator class.
    Class(ValidatorClass),
}

impl Target {
    pub fn of<T: Validatable>() -> Self {
        Self::Class(ValidatorClass::of::<T>())
    }
}

impl From<ValidatorClass> for Target {
    fn from(class: ValidatorClass) -> Self {
        Self::Class(class)
    }
}
