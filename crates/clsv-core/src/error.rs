//! # Error Types
//!
//! Errors shared across the workspace. All use `thiserror` for derive-based
//! `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Bag resolution never fails, so there is no registry error type.
//! - A rule engine reports rejections through [`ValidationFailure`], which
//!   carries one [`FieldError`] per violated rule. Callers receive it
//!   unmodified.
//! - Configuration problems surface as [`ConfigError`] at construction time.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure returned by a rule engine when a payload is checked against a bag.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    /// The payload violated one or more declared rules.
    #[error("validation failed for '{bag}':\n{errors}")]
    Rejected {
        /// Key of the bag the payload was checked against.
        bag: String,
        /// Individual rule violations.
        errors: FieldErrors,
    },

    /// The bag's schema could not be compiled by the engine.
    #[error("schema compile error for '{bag}': {reason}")]
    Schema {
        /// Key of the bag whose schema failed to compile.
        bag: String,
        /// Engine-provided reason.
        reason: String,
    },

    /// The payload passed every rule but could not be decoded into the
    /// target type.
    #[error("payload does not match the shape of '{bag}': {reason}")]
    Shape {
        /// Key of the bag the payload was checked against.
        bag: String,
        /// Decoder-provided reason.
        reason: String,
    },
}

impl ValidationFailure {
    /// Field errors carried by a rejection. Empty for the other variants.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Rejected { errors, .. } => errors.as_slice(),
            Self::Schema { .. } | Self::Shape { .. } => &[],
        }
    }
}

/// A single violated rule, addressed by its dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (`address.street`, `tags.0`).
    /// Empty for violations on the payload root.
    pub field: String,
    /// Name of the violated rule (`required`, `minLength`, `date`, ...).
    pub rule: String,
    /// Resolved message text.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "  (root) [{}]: {}", self.rule, self.message)
        } else {
            write!(f, "  {} [{}]: {}", self.field, self.rule, self.message)
        }
    }
}

/// Ordered collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all errors.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// Error while building configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Nonce length outside the representable range.
    #[error("nonce length must be between 1 and {max} digits, got {length}")]
    InvalidNonceLength {
        /// Requested number of digits.
        length: u32,
        /// Largest supported number of digits.
        max: u32,
    },

    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(field: &str, rule: &str, message: &str) -> FieldError {
        FieldError {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn field_error_display_root() {
        let e = error("", "type", "expected object");
        assert_eq!(e.to_string(), "  (root) [type]: expected object");
    }

    #[test]
    fn rejected_display_lists_every_error() {
        let failure = ValidationFailure::Rejected {
            bag: "1.User".to_string(),
            errors: vec![
                error("name", "required", "Name is required"),
                error("tags.0", "type", "must be a string"),
            ]
            .into(),
        };
        let display = failure.to_string();
        assert!(display.contains("'1.User'"));
        assert!(display.contains("name [required]: Name is required"));
        assert!(display.contains("tags.0 [type]: must be a string"));
        assert_eq!(failure.field_errors().len(), 2);
    }

    #[test]
    fn non_rejection_variants_have_no_field_errors() {
        let failure = ValidationFailure::Shape {
            bag: "1.User".to_string(),
            reason: "missing field `name`".to_string(),
        };
        assert!(failure.field_errors().is_empty());
    }

    #[test]
    fn field_errors_serialize_as_plain_array() {
        let errors: FieldErrors = vec![error("age", "minimum", "too young")].into();
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "field": "age", "rule": "minimum", "message": "too young" }])
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidNonceLength { length: 0, max: 18 };
        assert_eq!(
            err.to_string(),
            "nonce length must be between 1 and 18 digits, got 0"
        );
    }
}
