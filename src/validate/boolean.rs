// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::number::Number;
use crate::validate::context::Context;
use crate::validate::error::ValidationError;
use crate::validate::options::ValidatorOptions;
use crate::validate::Check;
use crate::value::Value;

use std::sync::Arc;

pub(super) fn compile(options: &ValidatorOptions) -> Arc<Check> {
    let strict = options.strict_types;
    let coerce = options.coerce_types;

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let b = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) if !strict => {
                if *n == Number::Int(0) {
                    Some(false)
                } else if *n == Number::Int(1) {
                    Some(true)
                } else {
                    None
                }
            }
            Value::String(s) if !strict => match s.as_ref() {
                "false" => Some(false),
                "true" => Some(true),
                _ => None,
            },
            _ => None,
        };
        match b {
            Some(b) if coerce => Some(Value::Bool(b)),
            Some(_) => Some(value.clone()),
            None => {
                ctx.report(ValidationError::InvalidType {
                    path: ctx.path(),
                    expected: "boolean".to_string(),
                    actual: value.clone(),
                });
                None
            }
        }
    })
}
