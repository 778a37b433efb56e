//! # Application State
//!
//! Shared state for an Axum application that validates request payloads
//! against class validator bags. Handlers never touch the state directly;
//! the [`Validated`](crate::extractors::Validated) extractor pulls the
//! validator out through [`FromRef`].

use std::sync::Arc;

use axum::extract::FromRef;
use clsv_core::{BagRegistry, ClassValidator};
use clsv_schema::{EngineOptions, JsonSchemaEngine};

/// The validator shared by all handlers of an application.
pub type ValidatorState = Arc<ClassValidator<JsonSchemaEngine>>;

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub validator: ValidatorState,
}

impl AppState {
    /// State over `registry` with the engine's default options.
    pub fn new(registry: Arc<BagRegistry>) -> Self {
        Self::with_engine(registry, JsonSchemaEngine::new())
    }

    /// State over `registry` with a preconfigured engine.
    pub fn with_engine(registry: Arc<BagRegistry>, engine: JsonSchemaEngine) -> Self {
        Self {
            validator: Arc::new(ClassValidator::new(registry, engine)),
        }
    }

    /// State over the process-wide registry. Unknown fields are rejected
    /// when `strict` is set.
    pub fn global(strict: bool) -> Self {
        let engine = JsonSchemaEngine::with_defaults(EngineOptions {
            allow_unknown_fields: !strict,
            ..EngineOptions::default()
        });
        Self::with_engine(BagRegistry::global(), engine)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(BagRegistry::default()))
    }
}

impl FromRef<AppState> for ValidatorState {
    fn from_ref(state: &AppState) -> Self {
        state.validator.clone()
    }
}
