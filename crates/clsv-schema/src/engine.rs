//! # JSON Schema Rule Engine
//!
//! [`JsonSchemaEngine`] implements [`RuleEngine`] on top of the `jsonschema`
//! crate. A bundle's schema is compiled per evaluation (Draft 2020-12),
//! the payload is checked, and violations are reported as
//! [`ValidationFailure::Rejected`] with messages resolved from the bundle.
//! A payload that passes is decoded into the caller's type.
//!
//! ## Options
//!
//! Read from the bundle's opaque config map; unknown keys are ignored.
//!
//! | Key                    | Type | Default | Effect                              |
//! |------------------------|------|---------|-------------------------------------|
//! | `bail`                 | bool | `false` | Stop at the first violation         |
//! | `allow_unknown_fields` | bool | `true`  | Accept fields no node declares      |

use clsv_core::{EngineArgs, EvaluationBundle, FieldError, RuleEngine, ValidationFailure};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::compile::compile_schema;
use crate::report::to_field_error;

/// Config key enabling first-violation bail-out.
pub const OPTION_BAIL: &str = "bail";

/// Config key controlling whether undeclared fields are accepted.
pub const OPTION_ALLOW_UNKNOWN_FIELDS: &str = "allow_unknown_fields";

/// Evaluation options understood by [`JsonSchemaEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub bail: bool,
    pub allow_unknown_fields: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            bail: false,
            allow_unknown_fields: true,
        }
    }
}

impl EngineOptions {
    /// Overlay recognized keys from `args` onto `self`.
    ///
    /// Keys holding a non-boolean value are ignored with a warning.
    pub fn merged_with(mut self, args: &EngineArgs) -> Self {
        if let Some(bail) = read_flag(args, OPTION_BAIL) {
            self.bail = bail;
        }
        if let Some(allow) = read_flag(args, OPTION_ALLOW_UNKNOWN_FIELDS) {
            self.allow_unknown_fields = allow;
        }
        self
    }
}

fn read_flag(args: &EngineArgs, key: &str) -> Option<bool> {
    match args.get(key)? {
        Value::Bool(flag) => Some(*flag),
        other => {
            tracing::warn!(option = key, value = %other, "ignoring non-boolean engine option");
            None
        }
    }
}

/// Rule engine backed by JSON Schema.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEngine {
    defaults: EngineOptions,
}

impl JsonSchemaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose options default to `defaults` before per-call overrides.
    pub fn with_defaults(defaults: EngineOptions) -> Self {
        Self { defaults }
    }

    /// Options in effect for a call carrying `args`.
    pub fn options_for(&self, args: &EngineArgs) -> EngineOptions {
        self.defaults.merged_with(args)
    }

    /// Check a bundle without decoding the payload.
    ///
    /// # Errors
    ///
    /// - [`ValidationFailure::Schema`] if the compiled document is rejected
    ///   by `jsonschema` (e.g. an invalid `pattern` keyword).
    /// - [`ValidationFailure::Rejected`] with one [`FieldError`] per violation.
    pub fn check(&self, bundle: &EvaluationBundle) -> Result<(), ValidationFailure> {
        let options = self.options_for(&bundle.config);
        let document = compile_schema(&bundle.schema, &options);

        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&document)
            .map_err(|e| ValidationFailure::Schema {
                bag: bundle.key.clone(),
                reason: e.to_string(),
            })?;

        let limit = if options.bail { 1 } else { usize::MAX };
        let errors: Vec<FieldError> = validator
            .iter_errors(&bundle.data)
            .take(limit)
            .map(|e| to_field_error(&e, &bundle.schema, &bundle.messages))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(key = %bundle.key, violations = errors.len(), "payload rejected");
            Err(ValidationFailure::Rejected {
                bag: bundle.key.clone(),
                errors: errors.into(),
            })
        }
    }
}

impl RuleEngine for JsonSchemaEngine {
    async fn evaluate<T>(&self, bundle: EvaluationBundle) -> Result<T, ValidationFailure>
    where
        T: DeserializeOwned + Send,
    {
        self.check(&bundle)?;
        let EvaluationBundle { key, data, .. } = bundle;
        serde_json::from_value(data).map_err(|e| ValidationFailure::Shape {
            bag: key,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> EngineArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn defaults_allow_unknown_and_do_not_bail() {
        let options = EngineOptions::default();
        assert!(!options.bail);
        assert!(options.allow_unknown_fields);
    }

    #[test]
    fn args_override_defaults() {
        let engine = JsonSchemaEngine::new();
        let options = engine.options_for(&args(&[
            (OPTION_BAIL, json!(true)),
            (OPTION_ALLOW_UNKNOWN_FIELDS, json!(false)),
        ]));
        assert!(options.bail);
        assert!(!options.allow_unknown_fields);
    }

    #[test]
    fn non_boolean_and_unknown_args_are_ignored() {
        let engine = JsonSchemaEngine::with_defaults(EngineOptions {
            bail: true,
            allow_unknown_fields: true,
        });
        let options = engine.options_for(&args(&[
            (OPTION_BAIL, json!("no")),
            ("locale", json!("fr")),
        ]));
        assert!(options.bail);
    }
}
