//! Integration tests: class validation through the JSON Schema engine.
//!
//! Exercises the full path a request takes: class hierarchy → composed bag →
//! compiled schema → violations with field-qualified messages, or a decoded
//! value shaped like the class.

use std::sync::Arc;

use clsv_core::{
    BagRegistry, ClassValidator, EngineArgs, FieldDeclarations, Messages, SchemaNode, Target,
    Validatable, ValidationFailure, ValidatorClass,
};
use clsv_schema::{JsonSchemaEngine, DATE_RULE, OPTION_ALLOW_UNKNOWN_FIELDS, OPTION_BAIL};
use serde::Deserialize;
use serde_json::{json, Value};

fn messages(pairs: &[(&str, &str)]) -> Messages {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn validator() -> ClassValidator<JsonSchemaEngine> {
    ClassValidator::new(Arc::new(BagRegistry::default()), JsonSchemaEngine::new())
}

fn rejected(failure: ValidationFailure) -> Vec<(String, String, String)> {
    match failure {
        ValidationFailure::Rejected { errors, .. } => errors
            .into_inner()
            .into_iter()
            .map(|e| (e.field, e.rule, e.message))
            .collect(),
        other => panic!("Expected Rejected, got: {other}"),
    }
}

// -- Fixture classes ----------------------------------------------------------

#[derive(Debug, Deserialize, PartialEq)]
struct Profile {
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    born: Option<String>,
}

impl Validatable for Profile {
    const NAME: &'static str = "Profile";
    fn declare(fields: &mut FieldDeclarations<'_>) {
        fields
            .field_with_messages(
                "name",
                SchemaNode::string().rule("minLength", 2),
                &messages(&[
                    ("required", "Name is required"),
                    ("minLength", "Name is too short"),
                ]),
            )
            .field_with_messages(
                "tags",
                SchemaNode::array(SchemaNode::string()).optional(),
                &messages(&[("type", "Tags must be strings")]),
            )
            .field_with_messages(
                "born",
                SchemaNode::date().optional(),
                &messages(&[(DATE_RULE, "Birth date must be a date")]),
            );
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct AdminProfile {
    name: String,
    level: u8,
}

impl Validatable for AdminProfile {
    const NAME: &'static str = "AdminProfile";
    fn parent() -> Option<ValidatorClass> {
        Some(ValidatorClass::of::<Profile>())
    }
    fn declare(fields: &mut FieldDeclarations<'_>) {
        fields.field_with_messages(
            "level",
            SchemaNode::integer().rule("minimum", 1).rule("maximum", 5),
            &messages(&[("maximum", "Level cannot exceed 5")]),
        );
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Address {
    street: String,
}

impl Validatable for Address {
    const NAME: &'static str = "Address";
    fn declare(fields: &mut FieldDeclarations<'_>) {
        fields.field_with_messages(
            "street",
            SchemaNode::string(),
            &messages(&[("required", "Street is required")]),
        );
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    billing: Address,
    shipping: Vec<Address>,
}

impl Validatable for Order {
    const NAME: &'static str = "Order";
    fn declare(fields: &mut FieldDeclarations<'_>) {
        fields
            .nested::<Address>("billing")
            .nested_array::<Address>("shipping");
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Counter {
    count: i64,
}

impl Validatable for Counter {
    const NAME: &'static str = "Counter";
    fn declare(fields: &mut FieldDeclarations<'_>) {
        fields.field("count", SchemaNode::opaque(Default::default()));
    }
}

struct BrokenPattern;

impl Validatable for BrokenPattern {
    const NAME: &'static str = "BrokenPattern";
    fn declare(fields: &mut FieldDeclarations<'_>) {
        fields.field("code", SchemaNode::string().rule("pattern", "(unclosed"));
    }
}

// -- Success ------------------------------------------------------------------

#[tokio::test]
async fn valid_payload_decodes_into_class_shape() {
    let out: Profile = validator()
        .validate(
            json!({ "name": "Ada", "tags": ["math"], "born": "1815-12-10" }),
            EngineArgs::new(),
        )
        .await
        .unwrap();
    assert_eq!(
        out,
        Profile {
            name: "Ada".into(),
            tags: vec!["math".into()],
            born: Some("1815-12-10".into()),
        }
    );
}

#[tokio::test]
async fn subclass_accepts_payload_satisfying_whole_chain() {
    let out: AdminProfile = validator()
        .validate(json!({ "name": "Grace", "level": 3 }), EngineArgs::new())
        .await
        .unwrap();
    assert_eq!(out.level, 3);
}

#[tokio::test]
async fn plain_target_accepts_any_object() {
    let out: Value = validator()
        .validate_target(Target::Plain, json!({ "anything": 1 }), EngineArgs::new())
        .await
        .unwrap();
    assert_eq!(out, json!({ "anything": 1 }));
}

// -- Rejections ---------------------------------------------------------------

#[tokio::test]
async fn missing_required_field_uses_declared_message() {
    let err = validator()
        .validate::<Profile>(json!({}), EngineArgs::new())
        .await
        .unwrap_err();
    assert_eq!(
        rejected(err),
        vec![("name".into(), "required".into(), "Name is required".into())]
    );
}

#[tokio::test]
async fn array_element_errors_match_wildcard_messages() {
    let err = validator()
        .validate::<Profile>(json!({ "name": "Ada", "tags": ["ok", 7] }), EngineArgs::new())
        .await
        .unwrap_err();
    assert_eq!(
        rejected(err),
        vec![("tags.1".into(), "type".into(), "Tags must be strings".into())]
    );
}

#[tokio::test]
async fn malformed_date_reports_date_rule() {
    let err = validator()
        .validate::<Profile>(json!({ "name": "Ada", "born": "last tuesday" }), EngineArgs::new())
        .await
        .unwrap_err();
    assert_eq!(
        rejected(err),
        vec![("born".into(), "date".into(), "Birth date must be a date".into())]
    );
}

#[tokio::test]
async fn inherited_rules_apply_to_subclass() {
    let err = validator()
        .validate::<AdminProfile>(json!({ "name": "A", "level": 9 }), EngineArgs::new())
        .await
        .unwrap_err();
    let mut errors = rejected(err);
    errors.sort();
    assert_eq!(
        errors,
        vec![
            ("level".into(), "maximum".into(), "Level cannot exceed 5".into()),
            ("name".into(), "minLength".into(), "Name is too short".into()),
        ]
    );
}

#[tokio::test]
async fn nested_class_messages_are_addressed_by_path() {
    let err = validator()
        .validate::<Order>(
            json!({ "billing": {}, "shipping": [{ "street": "Main" }, {}] }),
            EngineArgs::new(),
        )
        .await
        .unwrap_err();
    let mut errors = rejected(err);
    errors.sort();
    assert_eq!(
        errors,
        vec![
            ("billing.street".into(), "required".into(), "Street is required".into()),
            ("shipping.1.street".into(), "required".into(), "Street is required".into()),
        ]
    );
}

#[tokio::test]
async fn bail_stops_at_first_violation() {
    let mut args = EngineArgs::new();
    args.insert(OPTION_BAIL.into(), json!(true));
    let err = validator()
        .validate::<AdminProfile>(json!({}), args)
        .await
        .unwrap_err();
    assert_eq!(err.field_errors().len(), 1);
}

#[tokio::test]
async fn unknown_fields_rejected_when_disallowed() {
    let mut args = EngineArgs::new();
    args.insert(OPTION_ALLOW_UNKNOWN_FIELDS.into(), json!(false));
    let err = validator()
        .validate::<Address>(json!({ "street": "Main", "zip": "123" }), args)
        .await
        .unwrap_err();
    let errors = rejected(err);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "");
    assert_eq!(errors[0].1, "additionalProperties");
}

#[tokio::test]
async fn undecodable_payload_is_a_shape_failure() {
    let err = validator()
        .validate::<Counter>(json!({ "count": "many" }), EngineArgs::new())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ValidationFailure::Shape { bag, .. } if bag.ends_with(".Counter")),
        "Expected Shape, got: {err}"
    );
}

#[tokio::test]
async fn invalid_rule_keyword_is_a_schema_failure() {
    let err = validator()
        .validate_target::<Value>(
            Target::of::<BrokenPattern>(),
            json!({ "code": "x" }),
            EngineArgs::new(),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, ValidationFailure::Schema { .. }),
        "Expected Schema, got: {err}"
    );
}
