// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::number::Number;
use crate::types::Type;
use crate::value::Value;

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

/// Host-supplied predicate used as a fast reject before structural checks.
#[derive(Clone)]
pub struct TypeOf(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl TypeOf {
    pub fn new(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for TypeOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeOf(..)")
    }
}

/// Facets shared by every family.
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub description: Option<String>,
    pub required: Option<bool>,
    pub default: Option<Value>,
    pub annotations: IndexMap<String, Value>,
    pub type_of: Option<TypeOf>,
}

impl Header {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// A compiled `pattern` facet. Two patterns are equal when their sources are.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

/// Numeric `format` facet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    Int8,
    Int16,
    Int32,
    Int64,
    Int,
    Long,
    BigInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
}

// Largest finite single-precision float.
const F32_MAX: f64 = 3.402_823_466_385_288_6e38;

// Largest integer every f64 can represent exactly.
const SAFE_INTEGER: i64 = 9_007_199_254_740_991;

impl NumberFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8" => NumberFormat::Int8,
            "int16" => NumberFormat::Int16,
            "int32" => NumberFormat::Int32,
            "int64" => NumberFormat::Int64,
            "int" => NumberFormat::Int,
            "long" => NumberFormat::Long,
            "bigint" => NumberFormat::BigInt,
            "uint8" => NumberFormat::UInt8,
            "uint16" => NumberFormat::UInt16,
            "uint32" => NumberFormat::UInt32,
            "uint64" => NumberFormat::UInt64,
            "float" => NumberFormat::Float,
            "double" => NumberFormat::Double,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            NumberFormat::Int8 => "int8",
            NumberFormat::Int16 => "int16",
            NumberFormat::Int32 => "int32",
            NumberFormat::Int64 => "int64",
            NumberFormat::Int => "int",
            NumberFormat::Long => "long",
            NumberFormat::BigInt => "bigint",
            NumberFormat::UInt8 => "uint8",
            NumberFormat::UInt16 => "uint16",
            NumberFormat::UInt32 => "uint32",
            NumberFormat::UInt64 => "uint64",
            NumberFormat::Float => "float",
            NumberFormat::Double => "double",
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, NumberFormat::Float | NumberFormat::Double)
    }

    /// Formats whose values are compared on arbitrary-precision integers.
    pub fn is_big(&self) -> bool {
        matches!(
            self,
            NumberFormat::BigInt | NumberFormat::Int64 | NumberFormat::UInt64 | NumberFormat::Long
        )
    }

    /// Implicit `(minimum, maximum)` of the format.
    pub fn bounds(&self) -> (Option<Number>, Option<Number>) {
        match self {
            NumberFormat::Int8 => (Some(Number::Int(-128)), Some(Number::Int(127))),
            NumberFormat::Int16 => (Some(Number::Int(-32_768)), Some(Number::Int(32_767))),
            NumberFormat::Int32 => (
                Some(Number::Int(i64::from(i32::MIN))),
                Some(Number::Int(i64::from(i32::MAX))),
            ),
            NumberFormat::Int => (
                Some(Number::Int(-SAFE_INTEGER)),
                Some(Number::Int(SAFE_INTEGER)),
            ),
            NumberFormat::UInt8 => (Some(Number::Int(0)), Some(Number::Int(255))),
            NumberFormat::UInt16 => (Some(Number::Int(0)), Some(Number::Int(65_535))),
            NumberFormat::UInt32 => (
                Some(Number::Int(0)),
                Some(Number::UInt(u64::from(u32::MAX))),
            ),
            NumberFormat::UInt64 => (Some(Number::Int(0)), None),
            NumberFormat::Float => (Some(Number::Float(-F32_MAX)), Some(Number::Float(F32_MAX))),
            NumberFormat::Int64
            | NumberFormat::Long
            | NumberFormat::BigInt
            | NumberFormat::Double => (None, None),
        }
    }
}

/// Supported `format` values of `datetime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    Rfc3339,
    Rfc2616,
}

impl DateFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rfc3339" => Some(DateFormat::Rfc3339),
            "rfc2616" => Some(DateFormat::Rfc2616),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringFacets {
    pub enum_values: Vec<Value>,
    pub patterns: Vec<Pattern>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberFacets {
    pub enum_values: Vec<Value>,
    pub format: Option<NumberFormat>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub multiple_of: Option<Number>,
}

#[derive(Debug, Clone, Default)]
pub struct DateFacets {
    pub format: Option<DateFormat>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayFacets {
    pub items: Option<Type>,
    pub unique_items: Option<bool>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// A declared object property. `inherited` marks properties copied from a supertype.
#[derive(Debug, Clone)]
pub struct Property {
    pub ty: Type,
    pub inherited: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectFacets {
    pub properties: IndexMap<String, Property>,
    pub additional_properties: Option<bool>,
    pub discriminator: Option<String>,
    pub discriminator_value: Option<String>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct UnionFacets {
    pub members: Vec<Type>,
}

/// Family-specific facets of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    Any,
    String(StringFacets),
    Number(NumberFacets),
    Boolean,
    Nil,
    Date(DateFacets),
    Array(ArrayFacets),
    Object(ObjectFacets),
    Union(UnionFacets),
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Any => "any",
            Shape::String(_) => "string",
            Shape::Number(_) => "number",
            Shape::Boolean => "boolean",
            Shape::Nil => "nil",
            Shape::Date(_) => "date",
            Shape::Array(_) => "array",
            Shape::Object(_) => "object",
            Shape::Union(_) => "union",
        }
    }
}
