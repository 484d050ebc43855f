// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::value::Value;

use core::fmt;

use serde::Serialize;

/// What a [`ValidationError::RangeError`] measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeSubject {
    Value,
    Length,
    Items,
    Properties,
}

impl fmt::Display for RangeSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RangeSubject::Value => "Value",
            RangeSubject::Length => "Length",
            RangeSubject::Items => "Item count",
            RangeSubject::Properties => "Property count",
        })
    }
}

fn describe_range(min: &Option<Value>, max: &Option<Value>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("between {min} and {max}"),
        (Some(min), None) => format!("at least {min}"),
        (None, Some(max)) => format!("at most {max}"),
        (None, None) => "unbounded".to_string(),
    }
}

fn describe_list(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A problem found in a value.
///
/// Every error carries the dotted `path` of the offending value (empty for
/// the root) and serializes with an `errorType` tag so that it can be shown
/// to a client as is.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "errorType", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValidationError {
    #[error("Value required at '{path}'")]
    ValueRequired { path: String },

    #[error("Type mismatch at '{path}': expected {expected}, got {}", .actual.type_name())]
    InvalidType {
        path: String,
        expected: String,
        actual: Value,
    },

    #[error("{subject} {actual} at '{path}' is out of range: must be {}", describe_range(.min, .max))]
    RangeError {
        path: String,
        subject: RangeSubject,
        actual: Value,
        min: Option<Value>,
        max: Option<Value>,
    },

    #[error("Value {actual} at '{path}' is not a multiple of {multiple_of}")]
    NotMultipleOf {
        path: String,
        actual: Value,
        multiple_of: Value,
    },

    #[error("Value {actual} at '{path}' is not one of [{}]", describe_list(.allowed))]
    InvalidEnumValue {
        path: String,
        actual: Value,
        allowed: Vec<Value>,
    },

    #[error("Value {actual} at '{path}' does not match {format}")]
    FormatError {
        path: String,
        actual: Value,
        format: String,
    },

    #[error("Duplicate item {actual} at '{path}'")]
    DuplicateItem { path: String, actual: Value },

    #[error("Additional property '{property}' is not allowed at '{path}'")]
    NoAdditionalPropertiesAllowed { path: String, property: String },

    #[error("Discriminator '{discriminator}' at '{path}' must be \"{expected}\", got {actual}")]
    DiscriminatorMismatch {
        path: String,
        discriminator: String,
        expected: String,
        actual: Value,
    },

    #[error("Value at '{path}' does not match any member of the union")]
    NoUnionMemberMatched { path: String, actual: Value },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::ValueRequired { path }
            | ValidationError::InvalidType { path, .. }
            | ValidationError::RangeError { path, .. }
            | ValidationError::NotMultipleOf { path, .. }
            | ValidationError::InvalidEnumValue { path, .. }
            | ValidationError::FormatError { path, .. }
            | ValidationError::DuplicateItem { path, .. }
            | ValidationError::NoAdditionalPropertiesAllowed { path, .. }
            | ValidationError::DiscriminatorMismatch { path, .. }
            | ValidationError::NoUnionMemberMatched { path, .. } => path,
        }
    }

    /// The `errorType` tag.
    pub fn error_type(&self) -> &'static str {
        match self {
            ValidationError::ValueRequired { .. } => "valueRequired",
            ValidationError::InvalidType { .. } => "invalidType",
            ValidationError::RangeError { .. } => "rangeError",
            ValidationError::NotMultipleOf { .. } => "notMultipleOf",
            ValidationError::InvalidEnumValue { .. } => "invalidEnumValue",
            ValidationError::FormatError { .. } => "formatError",
            ValidationError::DuplicateItem { .. } => "duplicateItem",
            ValidationError::NoAdditionalPropertiesAllowed { .. } => {
                "noAdditionalPropertiesAllowed"
            }
            ValidationError::DiscriminatorMismatch { .. } => "discriminatorMismatch",
            ValidationError::NoUnionMemberMatched { .. } => "noUnionMemberMatched",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_message_has_both_bounds() {
        let e = ValidationError::RangeError {
            path: "age".to_string(),
            subject: RangeSubject::Value,
            actual: Value::from(128),
            min: Some(Value::from(-128)),
            max: Some(Value::from(127)),
        };
        assert_eq!(
            e.to_string(),
            "Value 128 at 'age' is out of range: must be between -128 and 127"
        );
    }

    #[test]
    fn serializes_with_error_type_tag() {
        let e = ValidationError::NoAdditionalPropertiesAllowed {
            path: "user".to_string(),
            property: "extra".to_string(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["errorType"], "noAdditionalPropertiesAllowed");
        assert_eq!(json["property"], "extra");
        assert_eq!(json["errorType"].as_str(), Some(e.error_type()));
    }

    #[test]
    fn multiple_of_field_is_camel_case() {
        let e = ValidationError::NotMultipleOf {
            path: String::new(),
            actual: Value::from(7),
            multiple_of: Value::from(2),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["multipleOf"], 2);
    }
}
