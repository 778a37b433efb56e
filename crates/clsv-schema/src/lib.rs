//! # clsv-schema — JSON Schema Rule Engine
//!
//! The rule-evaluation engine for `clsv` validator bags. Bags composed by
//! `clsv-core` are compiled into Draft 2020-12 documents and checked with
//! the `jsonschema` crate.
//!
//! ## Responsibilities
//!
//! - **Compilation** ([`compile`]): bag schema → JSON Schema document.
//! - **Evaluation** ([`engine`]): validate, then decode into the caller's type.
//! - **Reporting** ([`report`]): violations → field-qualified
//!   [`FieldError`](clsv_core::FieldError)s with messages looked up in the bag.

pub mod compile;
pub mod engine;
pub mod report;

// Re-export primary types.
pub use compile::{compile_node, compile_schema, DATE_PATTERN};
pub use engine::{EngineOptions, JsonSchemaEngine, OPTION_ALLOW_UNKNOWN_FIELDS, OPTION_BAIL};
pub use report::{lookup_message, DATE_RULE};
