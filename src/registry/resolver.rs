// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::declaration::{TypeDeclaration, TypeRef};
use crate::registry::{builtin, Library};
use crate::types::error::TypeError;
use crate::types::facets::*;
use crate::types::{BaseType, Type};

use indexmap::IndexMap;
use log::debug;

/// Resolution state of one batch of declarations.
///
/// Every name of the batch is pending until it is built. Names are built on
/// first request, so declarations may refer to ones that come later.
pub(super) struct Resolver<'a> {
    library: &'a Library,
    pending: IndexMap<String, &'a TypeDeclaration>,
    pub(super) built: IndexMap<String, Type>,
    // Names being built, outermost first.
    stack: Vec<String>,
    // References to names that were on the stack when requested.
    forwards: Vec<Type>,
}

impl<'a> Resolver<'a> {
    pub(super) fn new(library: &'a Library, pending: IndexMap<String, &'a TypeDeclaration>) -> Self {
        Self {
            library,
            pending,
            built: IndexMap::new(),
            stack: vec![],
            forwards: vec![],
        }
    }

    pub(super) fn resolve_name(&mut self, name: &str) -> Result<Type, TypeError> {
        if let Some(t) = self.built.get(name) {
            return Ok(t.clone());
        }
        if let Some(t) = self.library.get_type(name) {
            return Ok(t);
        }
        if let Some(pos) = self.stack.iter().position(|n| n == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(TypeError::DependencyCycle(cycle));
        }
        let Some(decl) = self.pending.get(name).copied() else {
            return Err(TypeError::UnknownTypeReference(name.to_string()));
        };

        debug!("resolving type {name}");
        self.stack.push(name.to_string());
        let result = self.build(decl);
        self.stack.pop();
        let t = result?;
        self.pending.shift_remove(name);
        self.built.insert(name.to_string(), t.clone());
        Ok(t)
    }

    /// The type a reference denotes. A list of references denotes an
    /// anonymous type extending all of them.
    pub(super) fn resolve_ref(&mut self, type_ref: &TypeRef) -> Result<Type, TypeError> {
        match type_ref {
            TypeRef::Name(name) => self.resolve_name(name),
            TypeRef::Inline(decl) => self.build(decl),
            TypeRef::Many(refs) => {
                let supertypes = self.resolve_all(refs)?;
                Type::compose(None, supertypes, Header::default(), Shape::Any)
            }
        }
    }

    fn resolve_all(&mut self, refs: &[TypeRef]) -> Result<Vec<Type>, TypeError> {
        refs.iter().map(|r| self.resolve_ref(r)).collect()
    }

    /// Like [`Resolver::resolve_ref`], for the type of a property or of array
    /// items. A name that is still being built is returned as a forward
    /// reference, which lets a type contain values of itself.
    fn resolve_nested(&mut self, type_ref: &TypeRef) -> Result<Type, TypeError> {
        match type_ref {
            TypeRef::Name(name) if self.stack.iter().any(|n| n == name) => {
                debug!("forward reference to {name}");
                let forward = Type::forward(name);
                self.forwards.push(forward.clone());
                Ok(forward)
            }
            _ => self.resolve_ref(type_ref),
        }
    }

    /// Binds every forward reference to the type it names. Called once all
    /// names of the batch are built.
    pub(super) fn bind_forwards(&mut self) -> Result<(), TypeError> {
        for forward in self.forwards.drain(..) {
            let name = forward.display_name().to_string();
            let target = self
                .built
                .get(&name)
                .cloned()
                .ok_or(TypeError::UnknownTypeReference(name))?;
            forward.bind(target);
        }
        Ok(())
    }

    pub(super) fn build(&mut self, decl: &TypeDeclaration) -> Result<Type, TypeError> {
        let supertypes = match &decl.type_ref {
            None => vec![builtin(infer_base(decl))],
            Some(TypeRef::Many(refs)) if refs.is_empty() => {
                return Err(TypeError::InvalidDeclaration(format!(
                    "type '{}' has an empty supertype list",
                    decl.display_name()
                )))
            }
            Some(TypeRef::Many(refs)) => self.resolve_all(refs)?,
            Some(r) => vec![self.resolve_ref(r)?],
        };

        // Facets are read for the family the type stands for. A union
        // supertype stands for its first member.
        let target = match (&decl.any_of, supertypes.first()) {
            (Some(_), _) => BaseType::Union,
            (None, Some(first)) => first.represented_base(),
            (None, None) => BaseType::Any,
        };
        check_facets(decl, target)?;
        let own_shape = self.own_shape(decl, target)?;
        Type::compose(decl.name.clone(), supertypes, own_header(decl), own_shape)
    }

    fn own_shape(&mut self, decl: &TypeDeclaration, target: BaseType) -> Result<Shape, TypeError> {
        let invalid = |facet: &str, reason: String| TypeError::InvalidFacet {
            type_name: decl.display_name().to_string(),
            facet: facet.to_string(),
            reason,
        };

        let mut shape = target.empty_shape();
        match &mut shape {
            Shape::String(f) => {
                f.enum_values = decl.enum_values.clone().unwrap_or_default();
                f.patterns = decl
                    .pattern
                    .iter()
                    .map(|p| Pattern::new(p).map_err(|e| invalid("pattern", e.to_string())))
                    .collect::<Result<_, _>>()?;
                f.min_length = decl.min_length;
                f.max_length = decl.max_length;
            }
            Shape::Number(f) => {
                f.enum_values = decl.enum_values.clone().unwrap_or_default();
                f.format = match &decl.format {
                    Some(name) => Some(NumberFormat::from_name(name).ok_or_else(|| {
                        invalid("format", format!("unknown numeric format '{name}'"))
                    })?),
                    None => None,
                };
                f.minimum = decl.minimum.clone();
                f.maximum = decl.maximum.clone();
                f.multiple_of = decl.multiple_of.clone();
            }
            Shape::Date(f) => {
                f.format = match &decl.format {
                    Some(name) if target == BaseType::DateTime => {
                        Some(DateFormat::from_name(name).ok_or_else(|| {
                            invalid("format", format!("unknown datetime format '{name}'"))
                        })?)
                    }
                    Some(_) => {
                        return Err(invalid(
                            "format",
                            format!("{target} does not take a format"),
                        ))
                    }
                    None => None,
                };
            }
            Shape::Array(f) => {
                f.items = match &decl.items {
                    // Several item types make a union.
                    Some(TypeRef::Many(refs)) => {
                        let members = refs
                            .iter()
                            .map(|r| self.resolve_nested(r))
                            .collect::<Result<Vec<_>, _>>()?;
                        Some(Type::compose(
                            None,
                            vec![builtin(BaseType::Union)],
                            Header::default(),
                            Shape::Union(UnionFacets { members }),
                        )?)
                    }
                    Some(r) => Some(self.resolve_nested(r)?),
                    None => None,
                };
                f.unique_items = decl.unique_items;
                f.min_items = decl.min_items;
                f.max_items = decl.max_items;
            }
            Shape::Object(f) => {
                for (name, r) in decl.properties.iter().flatten() {
                    let ty = self.resolve_nested(r)?;
                    f.properties.insert(
                        name.clone(),
                        Property {
                            ty,
                            inherited: false,
                        },
                    );
                }
                f.additional_properties = decl.additional_properties;
                f.discriminator.clone_from(&decl.discriminator);
                f.discriminator_value = match &decl.discriminator_value {
                    Some(v) => Some(v.stringify().ok_or_else(|| {
                        invalid("discriminatorValue", "must be a scalar".to_string())
                    })?),
                    None => None,
                };
                f.min_properties = decl.min_properties;
                f.max_properties = decl.max_properties;
            }
            Shape::Union(f) => {
                if let Some(refs) = &decl.any_of {
                    f.members = self.resolve_all(refs)?;
                }
            }
            Shape::Any | Shape::Boolean | Shape::Nil => (),
        }
        Ok(shape)
    }
}

fn infer_base(decl: &TypeDeclaration) -> BaseType {
    if decl.properties.is_some() {
        BaseType::Object
    } else if decl.any_of.is_some() {
        BaseType::Union
    } else if decl.items.is_some() {
        BaseType::Array
    } else {
        BaseType::String
    }
}

fn own_header(decl: &TypeDeclaration) -> Header {
    Header {
        description: decl.description.clone(),
        required: decl.required,
        default: decl.default.clone(),
        annotations: decl.annotations.clone(),
        type_of: decl.type_of.clone(),
    }
}

// Rejects facets that the family does not understand.
fn check_facets(decl: &TypeDeclaration, target: BaseType) -> Result<(), TypeError> {
    let string = target == BaseType::String;
    let number = matches!(target, BaseType::Number | BaseType::Integer);
    let array = target == BaseType::Array;
    let object = target == BaseType::Object;
    let facets = [
        ("enum", decl.enum_values.is_some(), string || number),
        ("pattern", !decl.pattern.is_empty(), string),
        ("minLength", decl.min_length.is_some(), string),
        ("maxLength", decl.max_length.is_some(), string),
        ("format", decl.format.is_some(), number || target.is_date()),
        ("minimum", decl.minimum.is_some(), number),
        ("maximum", decl.maximum.is_some(), number),
        ("multipleOf", decl.multiple_of.is_some(), number),
        ("items", decl.items.is_some(), array),
        ("uniqueItems", decl.unique_items.is_some(), array),
        ("minItems", decl.min_items.is_some(), array),
        ("maxItems", decl.max_items.is_some(), array),
        ("properties", decl.properties.is_some(), object),
        (
            "additionalProperties",
            decl.additional_properties.is_some(),
            object,
        ),
        ("discriminator", decl.discriminator.is_some(), object),
        (
            "discriminatorValue",
            decl.discriminator_value.is_some(),
            object,
        ),
        ("minProperties", decl.min_properties.is_some(), object),
        ("maxProperties", decl.max_properties.is_some(), object),
        ("anyOf", decl.any_of.is_some(), target == BaseType::Union),
    ];
    match facets.iter().find(|(_, present, allowed)| *present && !*allowed) {
        Some((facet, _, _)) => Err(TypeError::InvalidFacet {
            type_name: decl.display_name().to_string(),
            facet: facet.to_string(),
            reason: format!("not applicable to {target}"),
        }),
        None => Ok(()),
    }
}
