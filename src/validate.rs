// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::Shape;
use crate::types::{BaseType, Type};
use crate::validate::context::Context;
use crate::validate::error::ValidationError;
use crate::validate::options::{IgnoreRequired, ValidatorOptions};
use crate::value::Value;

use core::fmt;
use std::sync::{Arc, OnceLock};

use log::trace;

mod array;
mod boolean;
pub(crate) mod context;
mod date;
pub mod error;
mod nil;
mod number;
mod object;
pub mod options;
mod string;
mod union;


/// A compiled check. Returns the (possibly coerced) value, or `None` after
/// reporting at least one error to the context.
pub(crate) type Check = dyn Fn(&Value, &mut Context) -> Option<Value> + Send + Sync;

/// Checks and normalizes values against one type under one set of options.
///
/// Validators are cheap to clone and hold no mutable state, so a single
/// instance may be shared between threads.
#[derive(Clone)]
pub struct Validator {
    check: Arc<Check>,
    options: Arc<ValidatorOptions>,
    type_name: Arc<str>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("type_name", &self.type_name)
            .field("options", &self.options)
            .finish()
    }
}

impl Validator {
    /// Validates `value`, returning its normalized form or every error found
    /// (bounded by the error limits of the options).
    ///
    /// # Example
    /// ```rust
    /// use typegraph::*;
    /// use serde_json::json;
    ///
    /// let library = Library::new();
    /// let integer = library.get_type("integer").unwrap();
    /// let validator = integer.validator(&ValidatorOptions::coercing());
    /// assert_eq!(validator.validate(&Value::from("42")).unwrap(), Value::from(42));
    /// ```
    pub fn validate(&self, value: &Value) -> Result<Value, Vec<ValidationError>> {
        let mut ctx = Context::new(self.options.throw_on_first_error);
        let output = (self.check)(value, &mut ctx);
        if ctx.has_errors() {
            Err(ctx.into_errors())
        } else {
            Ok(output.unwrap_or(Value::Undefined))
        }
    }

    /// Like [`Validator::validate`] but stops at the first error and returns it.
    pub fn validate_or_raise(&self, value: &Value) -> Result<Value, ValidationError> {
        let mut ctx = Context::new(true);
        let output = (self.check)(value, &mut ctx);
        match ctx.into_errors().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(output.unwrap_or(Value::Undefined)),
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate_or_raise(value).is_ok()
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn run(&self, value: &Value, ctx: &mut Context) -> Option<Value> {
        (self.check)(value, ctx)
    }
}

/// Validator of a property or item type, compiled when first run. A
/// recursive type reaches its own validator while that is being compiled.
pub(crate) struct Nested {
    ty: Type,
    options: ValidatorOptions,
    validator: OnceLock<Validator>,
}

impl Nested {
    pub(crate) fn new(ty: &Type, options: &ValidatorOptions) -> Self {
        Self {
            ty: ty.clone(),
            options: options.clone(),
            validator: OnceLock::new(),
        }
    }

    pub(crate) fn run(&self, value: &Value, ctx: &mut Context) -> Option<Value> {
        self.validator
            .get_or_init(|| self.ty.validator(&self.options))
            .run(value, ctx)
    }
}

impl Type {
    /// The validator of this type for `options`, compiled on first use and
    /// cached on the node afterwards.
    pub fn validator(&self, options: &ValidatorOptions) -> Validator {
        if let Some(v) = self.validators.get(options) {
            trace!("validator cache hit for {}", self.display_name());
            return v.value().clone();
        }
        let validator = compile(self, options);
        self.validators
            .entry(options.clone())
            .or_insert(validator)
            .value()
            .clone()
    }
}

fn compile(node: &Type, options: &ValidatorOptions) -> Validator {
    trace!("compiling validator for {}", node.display_name());
    let alternatives = node.flatten();
    let accepts_nil = alternatives.iter().any(|t| t.base == BaseType::Nil);
    let check = match alternatives.as_slice() {
        [only] if only.ptr_eq(node) => guard(node, false, shape_check(node, options), options),
        // A single specialized alternative or union member. The node's own
        // header applies first, then the alternative's.
        [only] => {
            let inner = only.validator(options);
            let check: Arc<Check> =
                Arc::new(move |value: &Value, ctx: &mut Context| inner.run(value, ctx));
            guard(node, accepts_nil, check, options)
        }
        _ => guard(
            node,
            accepts_nil,
            union::compile(&alternatives, options),
            options,
        ),
    };
    Validator {
        check,
        options: Arc::new(options.clone()),
        type_name: node.display_name().into(),
    }
}

// Check for a type that is its own only alternative.
fn shape_check(node: &Type, options: &ValidatorOptions) -> Arc<Check> {
    match &node.shape {
        Shape::Any => Arc::new(|value: &Value, _: &mut Context| Some(value.clone())),
        Shape::String(f) => string::compile(f, options),
        Shape::Number(f) => number::compile(f, node.base == BaseType::Integer, options),
        Shape::Boolean => boolean::compile(options),
        Shape::Nil => nil::compile(),
        Shape::Date(f) => date::compile(node.base, f, options),
        Shape::Array(f) => array::compile(f, options),
        Shape::Object(f) => object::compile(node, f, options),
        // A union without members matches nothing.
        Shape::Union(_) => union::compile(&[], options),
    }
}

/// Handling shared by every type: missing values, `default`, `required` and
/// the `typeOf` predicate.
fn guard(node: &Type, accepts_nil: bool, check: Arc<Check>, options: &ValidatorOptions) -> Arc<Check> {
    let default = node.header.default.clone();
    let ignored = match node.name() {
        Some(name) => options.ignore_required.covers(name),
        None => options.ignore_required == IgnoreRequired::All,
    };
    let required = node.header.is_required() && !ignored;
    let type_of = node.header.type_of.clone();
    let expected = node.display_name().to_string();
    // Non-objects fail the object check before any predicate sees them.
    let object =
        matches!(node.shape, Shape::Object(_)) || matches!(node.own_shape, Shape::Object(_));

    Arc::new(move |value: &Value, ctx: &mut Context| {
        if value.is_missing() {
            if let Some(d) = &default {
                return Some(d.clone());
            }
            if accepts_nil {
                return Some(Value::Null);
            }
            if required {
                ctx.report(ValidationError::ValueRequired { path: ctx.path() });
                return None;
            }
            return Some(value.clone());
        }
        if object && !matches!(value, Value::Object(_)) {
            return check(value, ctx);
        }
        if let Some(predicate) = &type_of {
            if !predicate.test(value) {
                ctx.report(ValidationError::InvalidType {
                    path: ctx.path(),
                    expected: expected.clone(),
                    actual: value.clone(),
                });
                return None;
            }
        }
        check(value, ctx)
    })
}
