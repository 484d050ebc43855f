// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::StringFacets;
use crate::validate::context::Context;
use crate::validate::error::{RangeSubject, ValidationError};
use crate::validate::options::ValidatorOptions;
use crate::validate::Check;
use crate::value::Value;

use std::borrow::Cow;
use std::sync::Arc;

pub(super) fn compile(facets: &StringFacets, options: &ValidatorOptions) -> Arc<Check> {
    let facets = facets.clone();
    let strict = options.strict_types;
    let coerce = options.coerce_types;

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let text: Cow<'_, str> = match value {
            Value::String(s) => Cow::Borrowed(s.as_ref()),
            Value::Number(_) | Value::Bool(_) | Value::DateTime(_) if !strict => {
                Cow::Owned(value.stringify().unwrap_or_default())
            }
            _ => {
                ctx.report(ValidationError::InvalidType {
                    path: ctx.path(),
                    expected: "string".to_string(),
                    actual: value.clone(),
                });
                return None;
            }
        };

        if !facets.enum_values.is_empty()
            && !facets
                .enum_values
                .iter()
                .any(|e| e.stringify().as_deref() == Some(text.as_ref()))
        {
            ctx.report(ValidationError::InvalidEnumValue {
                path: ctx.path(),
                actual: value.clone(),
                allowed: facets.enum_values.clone(),
            });
            return None;
        }

        let length = text.chars().count();
        if facets.min_length.is_some_and(|min| length < min)
            || facets.max_length.is_some_and(|max| length > max)
        {
            ctx.report(ValidationError::RangeError {
                path: ctx.path(),
                subject: RangeSubject::Length,
                actual: Value::from(length),
                min: facets.min_length.map(Value::from),
                max: facets.max_length.map(Value::from),
            });
            return None;
        }

        if !facets.patterns.is_empty() && !facets.patterns.iter().any(|p| p.is_match(&text)) {
            ctx.report(ValidationError::FormatError {
                path: ctx.path(),
                actual: value.clone(),
                format: facets
                    .patterns
                    .iter()
                    .map(|p| format!("/{}/", p.source()))
                    .collect::<Vec<_>>()
                    .join(" or "),
            });
            return None;
        }

        Some(match text {
            Cow::Owned(s) if coerce => Value::from(s),
            _ => value.clone(),
        })
    })
}
