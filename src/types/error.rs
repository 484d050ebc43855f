// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Errors raised while declaring or constructing types.
///
/// Construction is all-or-nothing: a batch passed to
/// [`Library::add_types`](crate::Library::add_types) that fails with any of
/// these leaves the library as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("Type registration failed: a type with the name '{0}' is already registered.")]
    DuplicateTypeName(String),

    #[error("Type registration failed: the name '{0}' is invalid (empty or whitespace-only names are not allowed).")]
    InvalidName(String),

    #[error("Unknown type '{0}'")]
    UnknownTypeReference(String),

    #[error("Type '{type_name}' ({family}) cannot extend '{supertype}' ({supertype_family})")]
    IncompatibleExtension {
        type_name: String,
        family: String,
        supertype: String,
        supertype_family: String,
    },

    #[error("Dependency cycle detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Invalid facet '{facet}' on type '{type_name}': {reason}")]
    InvalidFacet {
        type_name: String,
        facet: String,
        reason: String,
    },

    #[error("Invalid type declaration: {0}")]
    InvalidDeclaration(String),
}

/// Checks that a type name is not empty or whitespace-only.
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.trim().is_empty() {
        Err(TypeError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
