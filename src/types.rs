// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::error::TypeError;
use crate::types::facets::*;
use crate::types::merge::MergeMode;
use crate::validate::options::ValidatorOptions;
use crate::validate::Validator;
use crate::value::Value;

use core::fmt;
use core::ops::Deref;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::debug;

pub mod error;
pub mod facets;
pub mod flatten;
pub mod merge;


/// The base type a node is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Nil,
    Date,
    DateOnly,
    TimeOnly,
    DateTimeOnly,
    DateTime,
    Array,
    Object,
    Union,
}

impl BaseType {
    pub const ALL: [BaseType; 14] = [
        BaseType::Any,
        BaseType::String,
        BaseType::Number,
        BaseType::Integer,
        BaseType::Boolean,
        BaseType::Nil,
        BaseType::Date,
        BaseType::DateOnly,
        BaseType::TimeOnly,
        BaseType::DateTimeOnly,
        BaseType::DateTime,
        BaseType::Array,
        BaseType::Object,
        BaseType::Union,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Any => "any",
            BaseType::String => "string",
            BaseType::Number => "number",
            BaseType::Integer => "integer",
            BaseType::Boolean => "boolean",
            BaseType::Nil => "nil",
            BaseType::Date => "date",
            BaseType::DateOnly => "date-only",
            BaseType::TimeOnly => "time-only",
            BaseType::DateTimeOnly => "datetime-only",
            BaseType::DateTime => "datetime",
            BaseType::Array => "array",
            BaseType::Object => "object",
            BaseType::Union => "union",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn family(&self) -> Family {
        match self {
            BaseType::Any => Family::Any,
            BaseType::Array => Family::Array,
            BaseType::Object => Family::Object,
            BaseType::Union => Family::Union,
            _ => Family::Scalar,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            BaseType::Date
                | BaseType::DateOnly
                | BaseType::TimeOnly
                | BaseType::DateTimeOnly
                | BaseType::DateTime
        )
    }

    /// Facet record with nothing set, for this base type.
    pub fn empty_shape(&self) -> Shape {
        match self {
            BaseType::Any => Shape::Any,
            BaseType::String => Shape::String(StringFacets::default()),
            BaseType::Number | BaseType::Integer => Shape::Number(NumberFacets::default()),
            BaseType::Boolean => Shape::Boolean,
            BaseType::Nil => Shape::Nil,
            BaseType::Date
            | BaseType::DateOnly
            | BaseType::TimeOnly
            | BaseType::DateTimeOnly
            | BaseType::DateTime => Shape::Date(DateFacets::default()),
            BaseType::Array => Shape::Array(ArrayFacets::default()),
            BaseType::Object => Shape::Object(ObjectFacets::default()),
            BaseType::Union => Shape::Union(UnionFacets::default()),
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extension compatibility classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Any,
    Scalar,
    Array,
    Object,
    Union,
}

impl Family {
    /// `any` and a union without members go with everything.
    pub fn is_compatible(self, other: Family) -> bool {
        self == other
            || matches!(self, Family::Any | Family::Union)
            || matches!(other, Family::Any | Family::Union)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::Any => "any",
            Family::Scalar => "scalar",
            Family::Array => "array",
            Family::Object => "object",
            Family::Union => "union",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable, fully resolved type.
pub struct TypeNode {
    pub(crate) name: Option<String>,
    pub(crate) base: BaseType,
    pub(crate) supertypes: Vec<Type>,

    // Effective facets: supertypes merged in order, then own facets.
    pub(crate) header: Header,
    pub(crate) shape: Shape,

    // Declared facets only. Flattening re-applies these to each alternative.
    pub(crate) own_header: Header,
    pub(crate) own_shape: Shape,

    pub(crate) builtin: bool,
    pub(crate) validators: DashMap<ValidatorOptions, Validator>,

    // Set on forward references to a type that was still being built.
    pub(crate) target: OnceLock<Type>,
}

impl TypeNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The name, or `<anonymous>` for inline declarations.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    pub fn base(&self) -> BaseType {
        self.base
    }

    pub fn supertypes(&self) -> &[Type] {
        &self.supertypes
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn own_header(&self) -> &Header {
        &self.own_header
    }

    pub fn own_shape(&self) -> &Shape {
        &self.own_shape
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_required(&self) -> bool {
        self.header.is_required()
    }

    /// Family used for extension checks. A union stands for its first member.
    pub fn family(&self) -> Family {
        match &self.shape {
            Shape::Union(u) => u.members.first().map_or(Family::Union, |m| m.family()),
            _ => self.base.family(),
        }
    }

    /// Base type whose facets a declaration extending this node may carry.
    pub fn represented_base(&self) -> BaseType {
        match &self.shape {
            Shape::Union(u) => u
                .members
                .first()
                .map_or(BaseType::Union, |m| m.represented_base()),
            _ => self.base,
        }
    }

    /// An effective property.
    ///
    /// A type extending a union keeps the union as its effective shape, so
    /// its declared properties are found here only through the alternatives
    /// of [`Type::flatten`], or in [`TypeNode::own_property`].
    pub fn property(&self, name: &str) -> Option<&Property> {
        match &self.shape {
            Shape::Object(o) => o.properties.get(name),
            _ => None,
        }
    }

    /// A property declared by the type itself.
    pub fn own_property(&self, name: &str) -> Option<&Property> {
        match &self.own_shape {
            Shape::Object(o) => o.properties.get(name),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&Type> {
        match &self.shape {
            Shape::Array(a) => a.items.as_ref(),
            _ => None,
        }
    }

    pub fn members(&self) -> &[Type] {
        match &self.shape {
            Shape::Union(u) => &u.members,
            _ => &[],
        }
    }
}

impl fmt::Debug for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Supertypes are listed by name to keep the output flat.
        let supertypes: Vec<&str> = self.supertypes.iter().map(|t| t.display_name()).collect();
        f.debug_struct("TypeNode")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("supertypes", &supertypes)
            .field("header", &self.header)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Shared handle to a [`TypeNode`].
#[derive(Clone)]
pub struct Type(Arc<TypeNode>);

impl Deref for Type {
    type Target = TypeNode;

    fn deref(&self) -> &TypeNode {
        match self.0.target.get() {
            Some(target) => &**target,
            None => &*self.0,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Recursive types would print forever.
        match self.0.target.get() {
            Some(target) => write!(f, "Type({})", target.display_name()),
            None => self.0.fmt(f),
        }
    }
}

impl Type {
    pub(crate) fn new(node: TypeNode) -> Type {
        Type(Arc::new(node))
    }

    /// Whether both handles point at the same node. A forward reference is
    /// the node it refers to.
    pub fn ptr_eq(&self, other: &Type) -> bool {
        core::ptr::eq::<TypeNode>(&**self, &**other)
    }

    /// A reference to `name`, usable before the named type exists. Until
    /// [`Type::bind`] is called it behaves as `any`.
    pub(crate) fn forward(name: &str) -> Type {
        Type::new(TypeNode {
            name: Some(name.to_string()),
            base: BaseType::Any,
            supertypes: vec![],
            header: Header::default(),
            shape: Shape::Any,
            own_header: Header::default(),
            own_shape: Shape::Any,
            builtin: false,
            validators: DashMap::new(),
            target: OnceLock::new(),
        })
    }

    /// Points a forward reference at its type. Later calls are ignored.
    pub(crate) fn bind(&self, target: Type) {
        if self.0.target.set(target).is_err() {
            debug!("forward reference {} is already bound", self.display_name());
        }
    }

    pub(crate) fn builtin(base: BaseType) -> Type {
        let mut header = Header::default();
        if base == BaseType::Nil {
            header.required = Some(false);
            header.default = Some(Value::Null);
        }
        Type::new(TypeNode {
            name: Some(base.name().to_string()),
            base,
            supertypes: vec![],
            header: header.clone(),
            shape: base.empty_shape(),
            own_header: header,
            own_shape: base.empty_shape(),
            builtin: true,
            validators: DashMap::new(),
            target: OnceLock::new(),
        })
    }

    /// Builds a node extending `supertypes` (in order) with its own declared facets.
    pub(crate) fn compose(
        name: Option<String>,
        supertypes: Vec<Type>,
        own_header: Header,
        own_shape: Shape,
    ) -> Result<Type, TypeError> {
        let Some(first) = supertypes.first() else {
            return Err(TypeError::InvalidDeclaration(format!(
                "type '{}' extends nothing",
                name.as_deref().unwrap_or("<anonymous>")
            )));
        };
        let base = first.base;
        let family = first.family();
        if let Some(st) = supertypes
            .iter()
            .skip(1)
            .find(|st| !family.is_compatible(st.family()))
        {
            return Err(TypeError::IncompatibleExtension {
                type_name: name.clone().unwrap_or_else(|| "<anonymous>".to_string()),
                family: family.to_string(),
                supertype: st.display_name().to_string(),
                supertype_family: st.family().to_string(),
            });
        }

        let (header, shape) = effective_facets(base, &supertypes, &own_header, &own_shape);
        debug!(
            "composed type {} ({base}) from [{}]",
            name.as_deref().unwrap_or("<anonymous>"),
            supertypes
                .iter()
                .map(|t| t.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Type::new(TypeNode {
            name,
            base,
            supertypes,
            header,
            shape,
            own_header,
            own_shape,
            builtin: false,
            validators: DashMap::new(),
            target: OnceLock::new(),
        }))
    }
}

/// Merges `sources` in order (inherit), then the declared facets (refine).
pub(crate) fn effective_facets(
    base: BaseType,
    sources: &[Type],
    own_header: &Header,
    own_shape: &Shape,
) -> (Header, Shape) {
    let mut header = Header::default();
    let mut shape = base.empty_shape();
    for source in sources {
        header.merge(&source.header, MergeMode::Inherit);
        shape.merge(&source.shape, MergeMode::Inherit);
    }
    header.merge(own_header, MergeMode::Refine);
    shape.merge(own_shape, MergeMode::Refine);
    if base == BaseType::Nil {
        header.required = Some(false);
        header.default = Some(Value::Null);
    }
    (header, shape)
}
