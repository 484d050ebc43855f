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

fn names(types: &[Type]) -> Vec<&str> {
    types.iter().map(|t| t.display_name()).collect()
}

#[test]
fn test_plain_types_are_their_own_alternative() {
    let lib = library(json!({
        "A": {"properties": {"a": "string"}},
        "B": {"type": "A", "properties": {"b": "string"}}
    }));
    for name in ["string", "A", "B"] {
        let t = lib.get_type(name).unwrap();
        let alternatives = t.flatten();
        assert_eq!(alternatives.len(), 1);
        assert!(alternatives[0].ptr_eq(&t));
    }
}

#[test]
fn test_union_of_unions_is_associative() {
    let lib = library(json!({
        "A": {"properties": {"a": "string"}},
        "B": {"properties": {"b": "string"}},
        "C": {"properties": {"c": "string"}},
        "BC": {"anyOf": ["B", "C"]},
        "Nested": {"anyOf": ["A", "BC"]},
        "Flat": {"anyOf": ["A", "B", "C"]}
    }));
    let nested = lib.get_type("Nested").unwrap().flatten();
    let flat = lib.get_type("Flat").unwrap().flatten();
    assert_eq!(names(&nested), vec!["A", "B", "C"]);
    assert_eq!(nested.len(), flat.len());
    for (n, f) in nested.iter().zip(flat.iter()) {
        assert!(n.ptr_eq(f));
    }
}

#[test]
fn test_extending_a_union_distributes_own_facets() {
    let lib = library(json!({
        "Cat": {"properties": {"meow": "boolean"}},
        "Dog": {"properties": {"bark": "boolean"}},
        "Pet": {"anyOf": ["Cat", "Dog"]},
        "Named": {"properties": {"name": "string"}},
        "NamedPet": {"type": ["Pet", "Named"], "properties": {"age": "integer"}}
    }));
    let named_pet = lib.get_type("NamedPet").unwrap();
    // The node itself keeps the union shape. Declared properties stay reachable.
    assert!(matches!(named_pet.shape(), Shape::Union(_)));
    assert!(named_pet.property("age").is_none());
    assert_eq!(
        named_pet.own_property("age").unwrap().ty.base(),
        BaseType::Integer
    );
    assert!(named_pet.own_property("name").is_none());

    let alternatives = named_pet.flatten();
    assert_eq!(alternatives.len(), 2);
    for alt in &alternatives {
        assert_eq!(alt.base(), BaseType::Object);
        assert_eq!(alt.name(), Some("NamedPet"));
        assert!(alt.property("name").is_some());
        assert!(alt.property("age").is_some());
        assert!(alt.supertypes().is_empty());
    }
    assert!(alternatives[0].property("meow").is_some());
    assert!(alternatives[0].property("bark").is_none());
    assert!(alternatives[1].property("bark").is_some());

    // A union node stands for its first member when checking extensions.
    assert_eq!(lib.get_type("Pet").unwrap().family(), Family::Object);
}

#[test]
fn test_cartesian_product_of_two_unions() {
    let lib = library(json!({
        "S1": {"type": "string", "minLength": 1},
        "S2": {"type": "string", "maxLength": 5},
        "U": {"anyOf": ["S1", "S2"]},
        "P1": {"type": "string", "pattern": "^a"},
        "P2": {"type": "string", "pattern": "^b"},
        "V": {"anyOf": ["P1", "P2"]},
        "UV": {"type": ["U", "V"]}
    }));
    let alternatives = lib.get_type("UV").unwrap().flatten();
    assert_eq!(alternatives.len(), 4);
    let summary: Vec<(Option<usize>, Option<usize>, String)> = alternatives
        .iter()
        .map(|t| match t.shape() {
            Shape::String(f) => (f.min_length, f.max_length, f.patterns[0].source().to_string()),
            _ => panic!("expected string facets"),
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some(1), None, "^a".to_string()),
            (Some(1), None, "^b".to_string()),
            (None, Some(5), "^a".to_string()),
            (None, Some(5), "^b".to_string()),
        ]
    );
}

#[test]
fn test_incompatible_combinations_are_dropped() {
    let lib = library(json!({
        "Text": {"type": "string"},
        "Thing": {"properties": {"x": "string"}},
        "Mixed": {"anyOf": ["Thing", "Text"]},
        "Other": {"properties": {"y": "string"}},
        "Both": {"type": ["Mixed", "Other"]}
    }));
    let alternatives = lib.get_type("Both").unwrap().flatten();
    assert_eq!(alternatives.len(), 1);
    assert!(alternatives[0].property("x").is_some());
    assert!(alternatives[0].property("y").is_some());
}
