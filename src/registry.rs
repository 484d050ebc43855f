// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::declaration::{TypeDeclaration, TypeRef};
use crate::types::error::{validate_name, TypeError};
use crate::types::{BaseType, Type};

use core::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

mod resolver;

use resolver::Resolver;

#[cfg(test)]
mod tests {
    mod library;
}

lazy_static::lazy_static! {
    /// Built-in types, shared by every library of the process.
    static ref BUILTINS: IndexMap<&'static str, Type> = BaseType::ALL
        .iter()
        .map(|base| (base.name(), Type::builtin(*base)))
        .collect();
}

pub(crate) fn builtin(base: BaseType) -> Type {
    match BUILTINS.get(base.name()) {
        Some(t) => t.clone(),
        None => Type::builtin(base),
    }
}

/// A document of declarations: either a map from name to declaration or a
/// list of named declarations.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Named(IndexMap<String, TypeDeclaration>),
    List(Vec<TypeDeclaration>),
}

impl Document {
    fn into_declarations(self) -> Vec<TypeDeclaration> {
        match self {
            Document::Named(map) => map
                .into_iter()
                .map(|(name, mut decl)| {
                    decl.name.get_or_insert(name);
                    decl
                })
                .collect(),
            Document::List(decls) => decls,
        }
    }
}

/// A set of named types.
///
/// A new library holds the built-in types (`any`, `string`, `number`,
/// `integer`, `boolean`, `nil`, `date`, `date-only`, `time-only`,
/// `datetime-only`, `datetime`, `array`, `object`, `union`). User types are
/// added in batches with [`Library::add_types`].
#[derive(Clone)]
pub struct Library {
    types: IndexMap<String, Type>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Library {
    pub fn new() -> Self {
        Self {
            types: BUILTINS
                .iter()
                .map(|(name, t)| (name.to_string(), t.clone()))
                .collect(),
        }
    }

    /// Registers a batch of declarations.
    ///
    /// Declarations may refer to each other in any order. Either every
    /// declaration is registered or, on error, none is. Returns the new types
    /// in declaration order.
    ///
    /// # Example
    /// ```rust
    /// use typegraph::*;
    /// use serde_json::json;
    ///
    /// let mut library = Library::new();
    /// let added = library
    ///     .add_types(vec![
    ///         TypeDeclaration::from_serde_json_value(json!({
    ///             "name": "Manager",
    ///             "type": "Employee",
    ///             "properties": { "reports": { "type": "array", "items": "Employee" } }
    ///         }))
    ///         .unwrap(),
    ///         TypeDeclaration::from_serde_json_value(json!({
    ///             "name": "Employee",
    ///             "properties": { "name": "string" }
    ///         }))
    ///         .unwrap(),
    ///     ])
    ///     .unwrap();
    /// assert_eq!(added.len(), 2);
    /// ```
    pub fn add_types(
        &mut self,
        declarations: impl IntoIterator<Item = TypeDeclaration>,
    ) -> Result<Vec<Type>, TypeError> {
        let declarations: Vec<TypeDeclaration> = declarations.into_iter().collect();

        let mut pending = IndexMap::new();
        for decl in &declarations {
            let name = decl.name.as_deref().unwrap_or_default();
            validate_name(name)?;
            if self.types.contains_key(name) || pending.contains_key(name) {
                return Err(TypeError::DuplicateTypeName(name.to_string()));
            }
            pending.insert(name.to_string(), decl);
        }

        let names: Vec<String> = pending.keys().cloned().collect();
        let mut resolver = Resolver::new(self, pending);
        let added = names
            .iter()
            .map(|name| resolver.resolve_name(name))
            .collect::<Result<Vec<_>, _>>()?;
        resolver.bind_forwards()?;

        for (name, t) in names.into_iter().zip(added.iter()) {
            self.types.insert(name, t.clone());
        }
        debug!("registered {} type(s)", added.len());
        Ok(added)
    }

    /// Registers the declarations of a JSON document.
    pub fn add_types_from_json(&mut self, json: &str) -> anyhow::Result<Vec<Type>> {
        let document: Document = serde_json::from_str(json)?;
        Ok(self.add_types(document.into_declarations())?)
    }

    /// Registers the declarations of a YAML document.
    #[cfg(feature = "yaml")]
    pub fn add_types_from_yaml(&mut self, yaml: &str) -> anyhow::Result<Vec<Type>> {
        let document: Document = serde_yaml::from_str(yaml)?;
        Ok(self.add_types(document.into_declarations())?)
    }

    pub fn get_type(&self, name: &str) -> Option<Type> {
        self.types.get(name).cloned()
    }

    /// Looks a name up, or builds an inline declaration without registering it.
    pub fn get_or_create(&self, type_ref: &TypeRef) -> Result<Type, TypeError> {
        match type_ref {
            TypeRef::Name(name) => self
                .get_type(name)
                .ok_or_else(|| TypeError::UnknownTypeReference(name.clone())),
            _ => Resolver::new(self, IndexMap::new()).resolve_ref(type_ref),
        }
    }

    /// Builds a type from a declaration without registering it. References
    /// must name types already in the library.
    pub fn create_type(&self, declaration: &TypeDeclaration) -> Result<Type, TypeError> {
        Resolver::new(self, IndexMap::new()).build(declaration)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of types, built-ins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type names in registration order, built-ins first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.types.iter().map(|(k, t)| (k.as_str(), t))
    }
}
