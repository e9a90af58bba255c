//! Expand/flatten properties that hold for any schema.

use provider_kit::{
    Attribute, Diagnostics, DriftPolicy, Flatten, ObjectValue, Operation, Schema, Value, WireCase,
    empty_sentinel, expand,
};
use serde_json::Value as Json;

fn group_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("group_id"),
        Attribute::string_set("roles"),
        Attribute::string_set("default_roles"),
    ]
}

fn schema() -> Schema {
    Schema::new(
        "widget",
        WireCase::Camel,
        vec![
            Attribute::string("id").read_only(),
            Attribute::string("name").required(),
            Attribute::bool("enabled"),
            Attribute::int32("retries"),
            Attribute::int64("lifetime"),
            Attribute::float64("ratio"),
            Attribute::string_list("ordered"),
            Attribute::string_set("tags"),
            Attribute::map("labels"),
            Attribute::object("mfa", vec![Attribute::string("setting"), Attribute::bool("enabled")]),
            Attribute::object_list("allowed_groups", group_fields()).empty_sentinel(),
        ],
    )
}

fn full_plan() -> ObjectValue {
    let group = ObjectValue::new()
        .with("group_id", "customers")
        .with("roles", Value::string_set(["USER"]))
        .with("default_roles", Value::string_set(["USER"]));
    ObjectValue::new()
        .with("id", "w-1")
        .with("name", "widget")
        .with("enabled", false)
        .with("retries", 0)
        .with("lifetime", 86_400_i64)
        .with("ratio", 0.5)
        .with("ordered", Value::string_list(["b", "a"]))
        .with("tags", Value::string_set(["x", "y"]))
        .with(
            "labels",
            Value::Map([("team".to_owned(), "iam".to_owned())].into_iter().collect()),
        )
        .with("mfa", ObjectValue::new().with("setting", "ALWAYS").with("enabled", true))
        .with("allowed_groups", Value::list([group.into()]))
}

fn echo(record: provider_kit::Record) -> Json {
    Json::Object(record)
}

#[test]
fn flatten_of_expand_is_identity_for_known_plans() {
    let plan = full_plan();
    let wire = echo(expand(&schema(), &plan));
    let mut diags = Diagnostics::new();
    let state = Flatten::new(&schema(), Operation::Read).run(wire.as_object().unwrap(), &mut diags);
    assert_eq!(state, plan);
    assert!(diags.is_empty());
}

#[test]
fn read_is_idempotent() {
    let wire = echo(expand(&schema(), &full_plan()));
    let record = wire.as_object().unwrap();
    let mut diags = Diagnostics::new();
    let first = Flatten::new(&schema(), Operation::Read).run(record, &mut diags);
    let second = Flatten::new(&schema(), Operation::Read)
        .basis(&first)
        .run(record, &mut diags);
    assert_eq!(first, second);
}

#[test]
fn wire_names_use_schema_case() {
    let wire = expand(&schema(), &full_plan());
    assert!(wire.contains_key("allowedGroups"));
    let group = &wire["allowedGroups"][0];
    assert_eq!(group["defaultRoles"], serde_json::json!(["USER"]));
}

#[test]
fn sentinel_is_sent_as_empty_list_and_null_is_omitted() {
    let sentinel = ObjectValue::new()
        .with("name", "w")
        .with("allowed_groups", empty_sentinel(&group_fields()));
    let wire = expand(&schema(), &sentinel);
    assert_eq!(wire["allowedGroups"], serde_json::json!([]));

    let omitted = ObjectValue::new().with("name", "w");
    assert!(!expand(&schema(), &omitted).contains_key("allowedGroups"));
}

#[test]
fn expand_never_emits_unknown() {
    let plan = ObjectValue::new()
        .with("id", Value::Unknown)
        .with("name", "w")
        .with("tags", Value::set([Value::from("a"), Value::Unknown]))
        .with("mfa", ObjectValue::new().with("setting", Value::Unknown));
    let wire = echo(expand(&schema(), &plan));
    assert_eq!(
        wire,
        serde_json::json!({"name": "w", "tags": ["a"], "mfa": {}})
    );
}

#[test]
fn create_fills_server_computed_fields_only() {
    let mut plan = full_plan();
    plan.set("id", Value::Unknown);
    let mut wire = expand(&schema(), &plan);
    wire.insert("id".to_owned(), Json::from("generated"));
    let mut diags = Diagnostics::new();
    let state = Flatten::new(&schema(), Operation::Create)
        .basis(&plan)
        .policy(DriftPolicy::default())
        .run(&wire, &mut diags);
    let mut expected = full_plan();
    expected.set("id", Value::from("generated"));
    assert_eq!(state, expected);
}

#[test]
fn sparse_nested_objects_survive_a_read() {
    let group = ObjectValue::new().with("group_id", "customers");
    let plan = ObjectValue::new()
        .with("name", "widget")
        .with("mfa", ObjectValue::new().with("setting", "OFF"))
        .with("allowed_groups", Value::list([group.into()]));
    let wire = expand(&schema(), &plan);
    let mut diags = Diagnostics::new();
    let state = Flatten::new(&schema(), Operation::Read).run(&wire, &mut diags);

    assert!(diags.is_empty());
    assert_eq!(state, plan);
    let mfa = state.get("mfa").as_object().unwrap();
    assert!(mfa.contains("enabled"));
    assert!(mfa.get("enabled").is_null());
}
