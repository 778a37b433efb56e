//! # clsv-core — Class-Hierarchy Validator Bags
//!
//! A type declares its validation rules once and subtypes inherit and
//! extend them. This crate composes those declarations into a
//! [`ValidatorBag`] per class and hands the bag to a rule engine when a
//! payload is checked.
//!
//! ## Components
//!
//! | Module          | Role                                                   |
//! |-----------------|--------------------------------------------------------|
//! | [`nonce`]       | Time-based tokens that make bag keys unique            |
//! | [`classify`]    | Array / date predicates over schema nodes              |
//! | [`messages`]    | Field-path qualification of rule messages              |
//! | [`registry`]    | Inheritance-aware, memoized bag resolution             |
//! | [`validator`]   | Entry point delegating to a [`RuleEngine`]             |
//!
//! ## Crate Policy
//!
//! - No field-level rule semantics live here. Nodes are opaque to the core
//!   except for their kind.
//! - Bag resolution never fails. Plain targets resolve to the empty bag.
//! - No `.unwrap()` outside tests.

pub mod bag;
pub mod class;
pub mod classify;
pub mod config;
pub mod declare;
pub mod error;
pub mod messages;
pub mod node;
pub mod nonce;
pub mod registry;
pub mod validator;

// Re-export primary types for ergonomic imports.
pub use bag::ValidatorBag;
pub use class::{ClassId, Target, Validatable, ValidatorClass};
pub use classify::{is_array, is_date};
pub use config::RegistryConfig;
pub use declare::FieldDeclarations;
pub use error::{ConfigError, FieldError, FieldErrors, ValidationFailure};
pub use messages::{transform_messages, Messages};
pub use node::{Descriptor, Schema, SchemaKind, SchemaNode};
pub use nonce::{Clock, FixedClock, KeyGenerator, SystemClock};
pub use registry::BagRegistry;
pub use validator::{ClassValidator, EngineArgs, EvaluationBundle, RuleEngine};
