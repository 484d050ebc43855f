// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::number::Number;
use crate::types::facets::NumberFacets;
use crate::validate::context::Context;
use crate::validate::error::{RangeSubject, ValidationError};
use crate::validate::options::ValidatorOptions;
use crate::validate::Check;
use crate::value::Value;

use core::cmp::Ordering;
use std::sync::Arc;

// Big formats compare exactly; the others go through f64.
fn compare(a: &Number, b: &Number, exact: bool) -> Option<Ordering> {
    if exact {
        a.partial_cmp(b)
    } else {
        a.as_f64().partial_cmp(&b.as_f64())
    }
}

fn in_enum(allowed: &[Value], n: &Number) -> bool {
    allowed.iter().any(|e| match e {
        Value::Number(m) => m == n,
        Value::String(s) => Number::parse(s).is_some_and(|m| m == *n),
        _ => false,
    })
}

pub(super) fn compile(
    facets: &NumberFacets,
    integer: bool,
    options: &ValidatorOptions,
) -> Arc<Check> {
    let (format_min, format_max) = facets.format.map(|f| f.bounds()).unwrap_or((None, None));
    let minimum = facets.minimum.clone().or(format_min);
    let maximum = facets.maximum.clone().or(format_max);
    let multiple_of = facets.multiple_of.clone();
    let enum_values = facets.enum_values.clone();
    let whole = integer || facets.format.is_some_and(|f| f.is_integer());
    let exact = facets.format.is_some_and(|f| f.is_big());
    let expected = if whole { "integer" } else { "number" };
    let strict = options.strict_types;
    let coerce = options.coerce_types;

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let parsed = match value {
            Value::Number(n) => Some(n.clone()),
            Value::String(s) if !strict => Number::parse(s),
            _ => None,
        };
        let n = match parsed {
            Some(n) if !whole || n.is_integer() => n,
            _ => {
                ctx.report(ValidationError::InvalidType {
                    path: ctx.path(),
                    expected: expected.to_string(),
                    actual: value.clone(),
                });
                return None;
            }
        };

        if !enum_values.is_empty() && !in_enum(&enum_values, &n) {
            ctx.report(ValidationError::InvalidEnumValue {
                path: ctx.path(),
                actual: value.clone(),
                allowed: enum_values.clone(),
            });
            return None;
        }

        let below = minimum
            .as_ref()
            .is_some_and(|m| compare(&n, m, exact) == Some(Ordering::Less));
        let above = maximum
            .as_ref()
            .is_some_and(|m| compare(&n, m, exact) == Some(Ordering::Greater));
        if below || above {
            ctx.report(ValidationError::RangeError {
                path: ctx.path(),
                subject: RangeSubject::Value,
                actual: Value::Number(n),
                min: minimum.clone().map(Value::from),
                max: maximum.clone().map(Value::from),
            });
            return None;
        }

        if let Some(m) = &multiple_of {
            if !n.is_multiple_of(m, exact) {
                ctx.report(ValidationError::NotMultipleOf {
                    path: ctx.path(),
                    actual: Value::Number(n),
                    multiple_of: Value::Number(m.clone()),
                });
                return None;
            }
        }

        if !coerce {
            return Some(value.clone());
        }
        let n = match n.to_bigint() {
            Some(b) if exact => Number::BigInt(Arc::new(b)),
            _ => n,
        };
        Some(Value::Number(n))
    })
}
