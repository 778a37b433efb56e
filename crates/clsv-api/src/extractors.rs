//! # Request Validation
//!
//! Two ways to run a class validator over an inbound request:
//!
//! - [`ClassValidateExt::class_validate`] on an `axum::extract::Request`,
//!   for handlers that own the request and pick the class themselves.
//! - The [`Validated<T>`] extractor, for handlers that only want the
//!   validated value.
//!
//! Both build the payload from the query string merged with the JSON
//! object body. Body keys win over query keys. An empty body is allowed,
//! so a `GET` with query parameters validates like a form.
//!
//! Query values arrive as text. A value for a field declared `integer`,
//! `number` or `boolean` is parsed into that type first; a value that does
//! not parse stays a string so the engine reports the `type` violation.

use std::collections::HashMap;
use std::future::Future;

use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, Query, Request};
use clsv_core::{
    ClassValidator, Descriptor, EngineArgs, RuleEngine, Schema, SchemaNode, Validatable,
};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::state::ValidatorState;

/// Largest request body read for validation.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Engine arguments attached to a request by middleware.
///
/// [`Validated<T>`] forwards them to the engine; requests without the
/// extension are validated with no arguments.
#[derive(Debug, Clone, Default)]
pub struct ValidationArgs(pub EngineArgs);

/// Request extension running a class validator over the request payload.
pub trait ClassValidateExt {
    /// Validate the request payload against `T`'s bag and decode it.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] if the body cannot be read, is not JSON,
    ///   or is JSON but not an object.
    /// - [`AppError::PayloadTooLarge`] if the body exceeds [`MAX_BODY_BYTES`].
    /// - [`AppError::Validation`] carrying the engine failure unchanged.
    fn class_validate<T, E>(
        self,
        validator: &ClassValidator<E>,
        args: EngineArgs,
    ) -> impl Future<Output = Result<T, AppError>> + Send
    where
        T: Validatable + DeserializeOwned + Send,
        E: RuleEngine;
}

impl ClassValidateExt for Request {
    async fn class_validate<T, E>(
        self,
        validator: &ClassValidator<E>,
        args: EngineArgs,
    ) -> Result<T, AppError>
    where
        T: Validatable + DeserializeOwned + Send,
        E: RuleEngine,
    {
        let bag = validator.registry().resolve::<T>();
        let payload = read_payload(self, &bag.schema).await?;
        let value = validator.validate::<T>(Value::Object(payload), args).await?;
        Ok(value)
    }
}

/// Collect query parameters and the JSON body into one object. Query
/// values are typed after the matching top-level node of `schema`.
async fn read_payload(req: Request, schema: &Schema) -> Result<Map<String, Value>, AppError> {
    let (parts, body) = req.into_parts();

    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let mut payload: Map<String, Value> = params
        .into_iter()
        .map(|(key, raw)| {
            let value = query_value(raw, schema.get(&key).map(|node| node.as_ref()));
            (key, value)
        })
        .collect();

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            let inner = e.into_inner();
            if inner.is::<LengthLimitError>() {
                AppError::PayloadTooLarge(MAX_BODY_BYTES)
            } else {
                AppError::BadRequest(format!("failed to read request body: {inner}"))
            }
        })?;

    payload.extend(parse_body(&bytes)?);
    Ok(payload)
}

/// Type a raw query value after the node declared for its field.
fn query_value(raw: String, node: Option<&SchemaNode>) -> Value {
    let declared = node.and_then(|node| {
        node.descriptor()
            .map(Descriptor::type_tag)
            .or_else(|| node.keywords().get("type").and_then(Value::as_str))
    });
    let parsed = match declared {
        Some("integer") => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<u64>().map(Value::from))
            .ok(),
        Some("number") => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Some("boolean") => raw.parse::<bool>().ok().map(Value::Bool),
        _ => None,
    };
    parsed.unwrap_or(Value::String(raw))
}

fn parse_body(bytes: &Bytes) -> Result<Map<String, Value>, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(AppError::BadRequest("request body must be a JSON object".into())),
        Err(e) => Err(AppError::BadRequest(format!("malformed JSON body: {e}"))),
    }
}

/// Extractor yielding a payload validated against `T`'s bag.
///
/// ```ignore
/// async fn create(Validated(signup): Validated<Signup>) -> impl IntoResponse {
///     // signup passed every rule declared on Signup and its ancestors
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Validatable + DeserializeOwned + Send,
    ValidatorState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let validator = ValidatorState::from_ref(state);
        let args = req
            .extensions()
            .get::<ValidationArgs>()
            .map(|ValidationArgs(args)| args.clone())
            .unwrap_or_default();
        req.class_validate::<T, _>(&*validator, args)
            .await
            .map(Validated)
    }
}
