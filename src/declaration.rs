// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::number::Number;
use crate::types::error::TypeError;
use crate::types::facets::TypeOf;
use crate::value::Value;

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Reference to a type from a declaration: a name, several supertypes, or an
/// inline declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Name(String),
    Many(Vec<TypeRef>),
    Inline(Box<TypeDeclaration>),
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl From<TypeDeclaration> for TypeRef {
    fn from(decl: TypeDeclaration) -> Self {
        TypeRef::Inline(Box::new(decl))
    }
}

/// A type declaration record, as handed over by a document loader.
///
/// Facets not understood by the declared base type are rejected when the type
/// is constructed, not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct TypeDeclaration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub type_ref: Option<TypeRef>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub annotations: IndexMap<String, Value>,

    // Scalars.
    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub pattern: Vec<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "number_facet")]
    pub minimum: Option<Number>,
    #[serde(default, deserialize_with = "number_facet")]
    pub maximum: Option<Number>,
    #[serde(default, deserialize_with = "number_facet")]
    pub multiple_of: Option<Number>,

    // Arrays.
    #[serde(default)]
    pub items: Option<TypeRef>,
    #[serde(default)]
    pub unique_items: Option<bool>,
    #[serde(default)]
    pub min_items: Option<usize>,
    #[serde(default)]
    pub max_items: Option<usize>,

    // Objects.
    #[serde(default)]
    pub properties: Option<IndexMap<String, TypeRef>>,
    #[serde(default)]
    pub additional_properties: Option<bool>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub discriminator_value: Option<Value>,
    #[serde(default)]
    pub min_properties: Option<usize>,
    #[serde(default)]
    pub max_properties: Option<usize>,

    // Unions.
    #[serde(default)]
    pub any_of: Option<Vec<TypeRef>>,

    #[serde(skip)]
    pub type_of: Option<TypeOf>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => vec![],
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

// Big integers may be written as strings.
fn number_facet<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(Value::String(s)) => Number::parse(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("'{s}' is not a number"))),
        Some(other) => Err(de::Error::custom(format!(
            "expected a number, found {}",
            other.type_name()
        ))),
    }
}

impl TypeDeclaration {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn extending(mut self, type_ref: impl Into<TypeRef>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }

    pub fn with_type_of(mut self, predicate: TypeOf) -> Self {
        self.type_of = Some(predicate);
        self
    }

    pub fn from_serde_json_value(value: serde_json::Value) -> Result<Self, TypeError> {
        serde_json::from_value(value).map_err(|e| TypeError::InvalidDeclaration(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self, TypeError> {
        serde_json::from_str(json).map_err(|e| TypeError::InvalidDeclaration(e.to_string()))
    }

    /// Name used in diagnostics.
    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_accepts_name_list_and_inline() {
        let d = TypeDeclaration::from_serde_json_value(json!({
            "name": "Both",
            "type": ["A", { "type": "string", "minLength": 2 }]
        }))
        .unwrap();
        let Some(TypeRef::Many(refs)) = d.type_ref else {
            panic!("expected a list of supertypes");
        };
        assert!(matches!(&refs[0], TypeRef::Name(n) if n == "A"));
        assert!(matches!(&refs[1], TypeRef::Inline(d) if d.min_length == Some(2)));
    }

    #[test]
    fn pattern_accepts_one_or_many() {
        let one = TypeDeclaration::from_serde_json_value(json!({"pattern": "^a"})).unwrap();
        assert_eq!(one.pattern, vec!["^a".to_string()]);
        let many = TypeDeclaration::from_serde_json_value(json!({"pattern": ["^a", "b$"]})).unwrap();
        assert_eq!(many.pattern.len(), 2);
    }

    #[test]
    fn big_bounds_may_be_strings() {
        let d = TypeDeclaration::from_serde_json_value(json!({
            "type": "integer",
            "format": "bigint",
            "maximum": "123456789012345678901234567890"
        }))
        .unwrap();
        assert!(matches!(d.maximum, Some(Number::BigInt(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = TypeDeclaration::from_serde_json_value(json!({"type": "string", "minLen": 1}))
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidDeclaration(_)));
    }

    #[test]
    fn properties_keep_declaration_order() {
        let d = TypeDeclaration::from_json_str(
            r#"{"properties": {"z": "string", "a": "number", "m": "boolean"}}"#,
        )
        .unwrap();
        let names: Vec<&str> = d.properties.as_ref().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
