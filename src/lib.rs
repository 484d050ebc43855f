// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A declarative type-composition engine.
//!
//! Named [`TypeDeclaration`]s that extend one another (several at once if
//! needed) are registered in a [`Library`]. The library resolves supertype
//! references, merges inherited facets and hands out immutable [`Type`]
//! nodes. Each node compiles into a [`Validator`] for a given
//! [`ValidatorOptions`]; validators check, coerce and normalize [`Value`]s.
//!
//! ```rust
//! use typegraph::*;
//! use serde_json::json;
//!
//! let mut library = Library::new();
//! library
//!     .add_types(vec![
//!         TypeDeclaration::from_serde_json_value(json!({
//!             "name": "Person",
//!             "properties": {
//!                 "name": { "type": "string", "required": true },
//!                 "age": { "type": "integer", "format": "uint8" }
//!             }
//!         }))
//!         .unwrap(),
//!     ])
//!     .unwrap();
//!
//! let person = library.get_type("Person").unwrap();
//! let validator = person.validator(&ValidatorOptions::default());
//! assert!(validator.validate(&Value::from(json!({"name": "Ada", "age": 36}))).is_ok());
//! ```

mod declaration;
mod number;
mod registry;
mod types;
mod validate;
mod value;

pub use declaration::{TypeDeclaration, TypeRef};
pub use number::Number;
pub use registry::Library;
pub use types::error::TypeError;
pub use types::facets::{
    ArrayFacets, DateFacets, DateFormat, Header, NumberFacets, NumberFormat, ObjectFacets,
    Pattern, Property, Shape, StringFacets, TypeOf, UnionFacets,
};
pub use types::merge::{merge, MergeMode};
pub use types::{BaseType, Family, Type, TypeNode};
pub use validate::error::{RangeSubject, ValidationError};
pub use validate::options::{IgnoreRequired, RemoveAdditional, ValidatorOptions};
pub use validate::Validator;
pub use value::{Map, Value};
