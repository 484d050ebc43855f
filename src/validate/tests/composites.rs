// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::panic, clippy::unwrap_used)]

use crate::*;
use serde_json::json;

fn library(decls: serde_json::Value) -> Library {
    let mut library = Library::new();
    library.add_types_from_json(&decls.to_string()).unwrap();
    library
}

fn create(decl: serde_json::Value) -> Type {
    Library::new()
        .create_type(&TypeDeclaration::from_serde_json_value(decl).unwrap())
        .unwrap()
}

fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

#[test]
fn test_unique_items() {
    let t = create(json!({"type": "array", "items": "integer", "uniqueItems": true}));
    let errors = t
        .validator(&ValidatorOptions::default())
        .validate(&value(json!([1, 2, 2])))
        .unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::DuplicateItem {
            path: "[2]".to_string(),
            actual: Value::from(2),
        }]
    );

    let coerced = t
        .validator(&ValidatorOptions::coercing())
        .validate(&value(json!([1, 2, 2])))
        .unwrap();
    assert_eq!(coerced, value(json!([1, 2])));
}

#[test]
fn test_item_bounds_apply_to_the_output() {
    let t = create(json!({
        "type": "array",
        "items": "string",
        "uniqueItems": true,
        "minItems": 2,
        "maxItems": 3
    }));
    let coercing = t.validator(&ValidatorOptions::coercing());
    let err = coercing.validate_or_raise(&value(json!(["a", "a"]))).unwrap_err();
    let ValidationError::RangeError { subject, actual, .. } = err else {
        panic!("expected RangeError");
    };
    assert_eq!(subject, RangeSubject::Items);
    assert_eq!(actual, Value::from(1));
    assert!(coercing.is_valid(&value(json!(["a", "b", "b", "c"]))));
    assert!(!coercing.is_valid(&value(json!(["a", "b", "c", "d"]))));
}

#[test]
fn test_scalars_are_wrapped_unless_strict() {
    let t = create(json!({"type": "array", "items": "string"}));
    assert_eq!(
        t.validator(&ValidatorOptions::default())
            .validate(&Value::from("solo"))
            .unwrap(),
        value(json!(["solo"]))
    );
    let err = t
        .validator(&ValidatorOptions::strict())
        .validate_or_raise(&Value::from("solo"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidType { expected, .. } if expected == "array"));
}

#[test]
fn test_item_errors_are_bounded() {
    let t = create(json!({"type": "array", "items": "integer"}));
    let input = value(json!([1, "x", "y", "z"]));
    let one = t
        .validator(&ValidatorOptions::strict())
        .validate(&input)
        .unwrap_err();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].path(), "[1]");

    let many = t
        .validator(&ValidatorOptions {
            strict_types: true,
            max_errors_per_array: 2,
            ..Default::default()
        })
        .validate(&input)
        .unwrap_err();
    let paths: Vec<&str> = many.iter().map(|e| e.path()).collect();
    assert_eq!(paths, vec!["[1]", "[2]"]);
}

#[test]
fn test_required_and_default_properties() {
    let t = create(json!({
        "properties": {
            "name": {"type": "string", "required": true},
            "role": {"type": "string", "default": "member"},
            "nickname": "string"
        }
    }));
    let v = t.validator(&ValidatorOptions::default());
    assert_eq!(
        v.validate(&value(json!({"name": "ada"}))).unwrap(),
        value(json!({"name": "ada", "role": "member"}))
    );
    assert_eq!(
        v.validate(&value(json!({}))).unwrap_err(),
        vec![ValidationError::ValueRequired {
            path: "name".to_string()
        }]
    );
    assert!(matches!(
        v.validate_or_raise(&Value::from("ada")),
        Err(ValidationError::InvalidType { expected, .. }) if expected == "object"
    ));
}

#[test]
fn test_ignore_required() {
    let lib = library(json!({
        "Name": {"type": "string", "required": true},
        "Person": {"properties": {
            "name": "Name",
            "id": {"type": "integer", "required": true}
        }}
    }));
    let person = lib.get_type("Person").unwrap();
    let by_property = ValidatorOptions {
        ignore_required: IgnoreRequired::Names(["id".to_string()].into_iter().collect()),
        ..Default::default()
    };
    let errors = person
        .validator(&by_property)
        .validate(&value(json!({})))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "name");

    // Type names work too.
    let by_type = ValidatorOptions {
        ignore_required: IgnoreRequired::Names(["Name".to_string()].into_iter().collect()),
        ..Default::default()
    };
    assert!(lib
        .get_type("Name")
        .unwrap()
        .validator(&by_type)
        .is_valid(&Value::Null));

    let all = ValidatorOptions {
        ignore_required: IgnoreRequired::All,
        ..Default::default()
    };
    assert_eq!(
        person.validator(&all).validate(&value(json!({}))).unwrap(),
        value(json!({}))
    );
}

#[test]
fn test_ignored_property_accepts_null() {
    let lib = library(json!({
        "Record": {"properties": {
            "id": {"type": "integer", "required": true},
            "code": {"type": "string", "required": true}
        }}
    }));
    let options = ValidatorOptions {
        ignore_required: IgnoreRequired::Names(["id".to_string()].into_iter().collect()),
        ..Default::default()
    };
    let v = lib.get_type("Record").unwrap().validator(&options);
    assert_eq!(
        v.validate(&value(json!({"id": null, "code": "a"}))).unwrap(),
        value(json!({"id": null, "code": "a"}))
    );
    assert!(v.is_valid(&value(json!({"code": "a"}))));
    // Properties not covered are still enforced.
    assert_eq!(
        v.validate_or_raise(&value(json!({"id": 1, "code": null})))
            .unwrap_err(),
        ValidationError::ValueRequired {
            path: "code".to_string()
        }
    );
}

#[test]
fn test_non_objects_fail_before_type_of() {
    let decl = TypeDeclaration::from_serde_json_value(json!({
        "name": "Tagged",
        "properties": {"tag": "string"}
    }))
    .unwrap()
    .with_type_of(TypeOf::new(|v| v.as_object().is_some_and(|o| o.contains_key("tag"))));
    let t = Library::new().create_type(&decl).unwrap();
    let v = t.validator(&ValidatorOptions::default());
    assert!(v.is_valid(&value(json!({"tag": "x"}))));

    let Err(ValidationError::InvalidType { expected, .. }) = v.validate_or_raise(&Value::from("x"))
    else {
        panic!("expected InvalidType");
    };
    assert_eq!(expected, "object");

    let Err(ValidationError::InvalidType { expected, .. }) = v.validate_or_raise(&value(json!({})))
    else {
        panic!("expected InvalidType");
    };
    assert_eq!(expected, "Tagged");
}

#[test]
fn test_additional_properties_and_removal() {
    let closed = create(json!({
        "properties": {"id": "integer"},
        "additionalProperties": false
    }));
    let open = create(json!({"properties": {"id": "integer"}}));
    let input = value(json!({"id": 1, "extra": true}));

    let err = closed
        .validator(&ValidatorOptions::default())
        .validate_or_raise(&input)
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::NoAdditionalPropertiesAllowed {
            path: String::new(),
            property: "extra".to_string()
        }
    );
    assert_eq!(
        open.validator(&ValidatorOptions::default())
            .validate(&input)
            .unwrap(),
        input
    );

    let remove = ValidatorOptions {
        remove_additional: RemoveAdditional::Yes,
        ..Default::default()
    };
    assert_eq!(
        closed.validator(&remove).validate(&input).unwrap(),
        value(json!({"id": 1}))
    );
    assert_eq!(open.validator(&remove).validate(&input).unwrap(), input);

    let remove_all = ValidatorOptions {
        remove_additional: RemoveAdditional::All,
        ..Default::default()
    };
    assert_eq!(
        open.validator(&remove_all).validate(&input).unwrap(),
        value(json!({"id": 1}))
    );
}

#[test]
fn test_property_bounds_count_the_input() {
    let t = create(json!({"properties": {}, "minProperties": 1, "maxProperties": 2}));
    let v = t.validator(&ValidatorOptions::default());
    assert!(v.is_valid(&value(json!({"a": 1}))));
    let err = v.validate_or_raise(&value(json!({"a": 1, "b": 2, "c": 3}))).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::RangeError { subject: RangeSubject::Properties, .. }
    ));
    assert!(err.to_string().starts_with("Property count 3"));
}

#[test]
fn test_error_limits_and_paths() {
    let lib = library(json!({
        "Line": {"properties": {"sku": {"type": "string", "minLength": 3}, "qty": "integer"}},
        "Order": {"properties": {
            "lines": {"type": "array", "items": "Line"},
            "total": "number"
        }}
    }));
    let order = lib.get_type("Order").unwrap();
    // Key order decides error order, so keep the input as written.
    let input = Value::from_json_str(
        r#"{
            "lines": [{"sku": "abc", "qty": 1}, {"sku": "x", "qty": "many"}],
            "total": "lots"
        }"#,
    )
    .unwrap();

    let defaults = order.validator(&ValidatorOptions::strict()).validate(&input).unwrap_err();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].path(), "lines[1].sku");

    let generous = ValidatorOptions {
        strict_types: true,
        max_errors_per_object: 10,
        ..Default::default()
    };
    let errors = order.validator(&generous).validate(&input).unwrap_err();
    let paths: Vec<&str> = errors.iter().map(|e| e.path()).collect();
    assert_eq!(paths, vec!["lines[1].sku", "lines[1].qty", "total"]);

    let first_only = ValidatorOptions {
        throw_on_first_error: true,
        ..generous
    };
    let errors = order.validator(&first_only).validate(&input).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "lines[1].sku");
}

#[test]
fn test_coerced_objects_are_fixed_points() {
    let t = create(json!({
        "properties": {
            "count": "integer",
            "tags": {"type": "array", "items": "string", "uniqueItems": true},
            "when": "datetime",
            "flag": {"type": "boolean", "default": false}
        }
    }));
    let v = t.validator(&ValidatorOptions::coercing());
    let once = v
        .validate(&value(json!({
            "count": "7",
            "tags": ["a", "a", 1],
            "when": "2020-01-02t03:04:05z"
        })))
        .unwrap();
    assert_eq!(
        once,
        value(json!({
            "count": 7,
            "tags": ["a", "1"],
            "when": "2020-01-02T03:04:05Z",
            "flag": false
        }))
    );
    assert_eq!(v.validate(&once).unwrap(), once);
}

#[test]
fn test_recursive_types_validate_nested_values() {
    let lib = library(json!({
        "Tree": {"properties": {
            "label": {"type": "string", "required": true},
            "children": {"type": "array", "items": "Tree"}
        }},
        "Chain": {"properties": {"value": "integer", "next": "Chain"}}
    }));
    let tree = lib.get_type("Tree").unwrap();
    let v = tree.validator(&ValidatorOptions::strict());
    let input = value(json!({
        "label": "root",
        "children": [{"label": "a", "children": [{"label": "a1"}]}, {"label": "b"}]
    }));
    assert_eq!(v.validate(&input).unwrap(), input);

    let err = v
        .validate_or_raise(&value(json!({
            "label": "root",
            "children": [{"label": "a", "children": [{}]}]
        })))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::ValueRequired {
            path: "children[0].children[0].label".to_string()
        }
    );

    let chain = lib
        .get_type("Chain")
        .unwrap()
        .validator(&ValidatorOptions::coercing());
    assert_eq!(
        chain
            .validate(&value(json!({"value": "1", "next": {"value": "2"}})))
            .unwrap(),
        value(json!({"value": 1, "next": {"value": 2}}))
    );
}
