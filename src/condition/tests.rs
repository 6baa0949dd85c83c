//! Tests for condition specs, the registry and condition sets
//!
//! Tests cover:
//! - Built-in condition semantics
//! - Option decoding and validation
//! - Permissive vs strict handling of unknown types
//! - Registry merging and custom conditions

use super::*;
use crate::error::AuthzError;
use crate::request::Request;
use crate::role::Role;
use crate::subject::Subject;
use serde_json::{json, Value};
use std::sync::Arc;
use test_case::test_case;

fn request() -> Request {
    Request::new("doc", "read", Subject::new("alice").with_role(Role::new("editor").into_ref()))
}

#[test]
fn test_empty_set_meets() {
    let conditions = Conditions::from_specs(&[], &ConditionRegistry::default()).unwrap();
    assert!(conditions.is_empty());
    assert!(conditions.meets(&request()));
}

#[test_case(json!(true), true ; "true meets")]
#[test_case(json!(false), false ; "false does not meet")]
#[test_case(json!("true"), false ; "string is not a bool")]
#[test_case(json!(1), false ; "number is not a bool")]
fn test_bool_condition(value: Value, expected: bool) {
    let specs = vec![ConditionSpec::new("let-me-in", "bool").with_option("value", true)];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();

    let req = request().with_metadata("let-me-in", value);
    assert_eq!(conditions.meets(&req), expected);
}

#[test]
fn test_bool_condition_missing_metadata() {
    let specs = vec![ConditionSpec::new("let-me-in", "bool").with_option("value", true)];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();
    assert!(!conditions.meets(&request()));
}

#[test]
fn test_bool_condition_default_value() {
    // No options decodes to value = false
    let specs = vec![ConditionSpec::new("disabled", "bool")];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();
    assert!(conditions.meets(&request().with_metadata("disabled", false)));
    assert!(!conditions.meets(&request().with_metadata("disabled", true)));
}

#[test_case(json!("alice"), true ; "subject id")]
#[test_case(json!("editor"), true ; "direct role id")]
#[test_case(json!("bob"), false ; "other subject")]
#[test_case(json!(["bob", "alice"]), true ; "list containing subject")]
#[test_case(json!(["bob", "carol"]), false ; "list without subject")]
#[test_case(json!(42), false ; "wrong type")]
fn test_subject_equals(value: Value, expected: bool) {
    let condition = SubjectEqualsCondition::default();
    assert_eq!(condition.meets(Some(&value), &request()), expected);
}

#[test]
fn test_role_equals_alias() {
    let specs = vec![ConditionSpec::new("owner", "role_equals")];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();

    assert_eq!(conditions.get("owner").unwrap().name(), "subject_equals");
    assert!(conditions.meets(&request().with_metadata("owner", "alice")));
    assert!(!conditions.meets(&request().with_metadata("owner", "mallory")));
}

#[test]
fn test_all_conditions_must_meet() {
    let specs = vec![
        ConditionSpec::new("mfa", "bool").with_option("value", true),
        ConditionSpec::new("owner", "subject_equals"),
    ];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();
    assert_eq!(conditions.names().collect::<Vec<_>>(), vec!["mfa", "owner"]);

    let both = request().with_metadata("mfa", true).with_metadata("owner", "alice");
    let one = request().with_metadata("mfa", true).with_metadata("owner", "bob");
    assert!(conditions.meets(&both));
    assert!(!conditions.meets(&one));
}

#[test]
fn test_later_spec_with_same_name_replaces() {
    let specs = vec![
        ConditionSpec::new("flag", "bool").with_option("value", true),
        ConditionSpec::new("flag", "bool").with_option("value", false),
    ];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();
    assert_eq!(conditions.len(), 1);
    assert!(conditions.meets(&request().with_metadata("flag", false)));
}

#[test]
fn test_unknown_type_dropped_when_permissive() {
    let specs = vec![
        ConditionSpec::new("office_hours", "time_window"),
        ConditionSpec::new("mfa", "bool").with_option("value", true),
    ];
    let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();
    assert_eq!(conditions.len(), 1);
    assert!(conditions.get("office_hours").is_none());
}

#[test]
fn test_unknown_type_rejected_when_strict() {
    let registry = ConditionRegistry::default().with_mode(ConditionMode::Strict);
    let specs = vec![ConditionSpec::new("office_hours", "time_window")];
    let result = Conditions::from_specs(&specs, &registry);
    assert!(matches!(
        result,
        Err(AuthzError::UnknownConditionType { ref name, ref condition_type })
            if name == "office_hours" && condition_type == "time_window"
    ));
}

#[test_case(json!({"value": "yes"}) ; "wrong option type")]
#[test_case(json!({"value": true, "extra": 1}) ; "unknown option")]
fn test_invalid_bool_options(options: Value) {
    let spec = ConditionSpec {
        name: "flag".to_string(),
        condition_type: "bool".to_string(),
        options: options.as_object().cloned().unwrap(),
    };
    let result = Conditions::from_specs(&[spec], &ConditionRegistry::default());
    assert!(matches!(result, Err(AuthzError::InvalidConditionOptions { .. })));
}

#[test]
fn test_network_conditions_are_opt_in() {
    let registry = ConditionRegistry::default();
    assert!(!registry.contains("ip_allow"));

    let registry = registry.with_network_conditions();
    assert!(registry.contains("ip_allow"));
    assert!(registry.contains("ip_deny"));
}

#[test]
fn test_ip_allow_condition() {
    let registry = ConditionRegistry::default().with_network_conditions();
    let specs = vec![ConditionSpec::new("office-ip", "ip_allow")
        .with_option("networks", json!(["192.168.1.0/24"]))];
    let conditions = Conditions::from_specs(&specs, &registry).unwrap();

    assert!(conditions.meets(&request().with_metadata("office-ip", "192.168.1.20")));
    assert!(!conditions.meets(&request().with_metadata("office-ip", "192.168.10.111")));
    assert!(!conditions.meets(&request().with_metadata("office-ip", "not an ip")));
    assert!(!conditions.meets(&request()));
}

#[test]
fn test_ip_deny_condition() {
    let registry = ConditionRegistry::default().with_network_conditions();
    let specs = vec![ConditionSpec::new("client-ip", "ip_deny")
        .with_option("networks", json!(["10.0.0.0/8", "172.16.0.0/12"]))];
    let conditions = Conditions::from_specs(&specs, &registry).unwrap();

    assert!(conditions.meets(&request().with_metadata("client-ip", "192.168.1.1")));
    assert!(!conditions.meets(&request().with_metadata("client-ip", "10.1.2.3")));
    assert!(!conditions.meets(&request().with_metadata("client-ip", "172.20.0.1")));
    assert!(!conditions.meets(&request()));
}

#[test]
fn test_ip_condition_rejects_bad_network() {
    let registry = ConditionRegistry::default().with_network_conditions();
    let specs = vec![ConditionSpec::new("office-ip", "ip_allow")
        .with_option("networks", json!(["192.168.1.0/40"]))];
    let result = Conditions::from_specs(&specs, &registry);
    assert!(matches!(result, Err(AuthzError::InvalidConditionOptions { .. })));
}

#[derive(Debug)]
struct AlwaysMeets;

impl Condition for AlwaysMeets {
    fn name(&self) -> &'static str {
        "always"
    }

    fn meets(&self, _value: Option<&Value>, _request: &Request) -> bool {
        true
    }
}

#[test]
fn test_merge_later_entries_override() {
    let mut custom = ConditionRegistry::empty();
    custom.register("bool", |_spec| Ok(Arc::new(AlwaysMeets) as Arc<dyn Condition>));

    let registry = ConditionRegistry::default().merge(custom);
    let specs = vec![ConditionSpec::new("flag", "bool").with_option("value", true)];
    let conditions = Conditions::from_specs(&specs, &registry).unwrap();

    assert_eq!(conditions.get("flag").unwrap().name(), "always");
    assert!(conditions.meets(&request()));
    assert!(registry.contains("subject_equals"));
}

#[test]
fn test_merge_keeps_mode() {
    let registry = ConditionRegistry::default()
        .with_mode(ConditionMode::Strict)
        .merge(ConditionRegistry::empty());
    assert_eq!(registry.mode(), ConditionMode::Strict);
}

#[test]
fn test_type_names_sorted() {
    let registry = ConditionRegistry::default();
    assert_eq!(registry.type_names(), vec!["bool", "role_equals", "subject_equals"]);
    assert!(format!("{:?}", registry).contains("Permissive"));
}

#[test]
fn test_spec_deserialize_null_options() {
    let spec: ConditionSpec =
        serde_json::from_str(r#"{"name":"owner","type":"role_equals","options":null}"#).unwrap();
    assert!(spec.options.is_empty());

    let spec: ConditionSpec = serde_json::from_str(r#"{"name":"owner","type":"role_equals"}"#).unwrap();
    assert!(spec.options.is_empty());
}

#[test]
fn test_spec_serialize_shape() {
    let spec = ConditionSpec::new("let-me-in", "bool").with_option("value", true);
    assert_eq!(
        serde_json::to_string(&spec).unwrap(),
        r#"{"name":"let-me-in","type":"bool","options":{"value":true}}"#
    );
}
