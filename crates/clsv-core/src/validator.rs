//! # Validation Entry Point
//!
//! [`ClassValidator`] adapts the class-hierarchy model to a rule engine: it
//! resolves the bag of the requested class, packages it with the payload
//! into an [`EvaluationBundle`], and hands the bundle to a [`RuleEngine`].
//! The engine's result is returned unchanged; this layer has no rule
//! semantics of its own.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::class::{Target, Validatable};
use crate::error::ValidationFailure;
use crate::messages::Messages;
use crate::node::Schema;
use crate::registry::BagRegistry;

/// Engine options. Opaque to this crate and forwarded verbatim.
pub type EngineArgs = Map<String, Value>;

/// Everything an engine needs to check one payload.
#[derive(Debug, Clone)]
pub struct EvaluationBundle {
    /// Key of the bag the schema was taken from. Empty for plain targets.
    pub key: String,
    pub schema: Schema,
    pub messages: Messages,
    /// The payload under validation.
    pub data: Value,
    /// Caller-supplied engine options.
    pub config: EngineArgs,
}

/// A rule-evaluation engine.
///
/// On success the engine returns the payload decoded as `T`; on failure it
/// returns a structured [`ValidationFailure`].
pub trait RuleEngine: Send + Sync {
    fn evaluate<T>(
        &self,
        bundle: EvaluationBundle,
    ) -> impl Future<Output = Result<T, ValidationFailure>> + Send
    where
        T: DeserializeOwned + Send;
}

/// Validates payloads against the bags of validator classes.
#[derive(Debug)]
pub struct ClassValidator<E> {
    registry: Arc<BagRegistry>,
    engine: E,
}

impl<E: RuleEngine> ClassValidator<E> {
    pub fn new(registry: Arc<BagRegistry>, engine: E) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &Arc<BagRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate `data` against `T`'s bag and decode it as `T`.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`ValidationFailure`] as produced.
    pub async fn validate<T>(&self, data: Value, args: EngineArgs) -> Result<T, ValidationFailure>
    where
        T: Validatable + DeserializeOwned + Send,
    {
        self.validate_target(Target::of::<T>(), data, args).await
    }

    /// Validate `data` against the bag of an arbitrary target and decode it
    /// as `T`. A plain target validates against the empty bag.
    pub async fn validate_target<T>(
        &self,
        target: Target,
        data: Value,
        args: EngineArgs,
    ) -> Result<T, ValidationFailure>
    where
        T: DeserializeOwned + Send,
    {
        let bag = self.registry.resolve_target(target);
        tracing::debug!(key = %bag.key, fields = bag.schema.len(), "evaluating payload");

        let bundle = EvaluationBundle {
            key: bag.key.clone(),
            schema: bag.schema.clone(),
            messages: bag.messages.clone(),
            data,
            config: args,
        };
        self.engine.evaluate::<T>(bundle).await
    }
}
