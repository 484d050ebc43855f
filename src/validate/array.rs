// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::ArrayFacets;
use crate::validate::context::Context;
use crate::validate::error::{RangeSubject, ValidationError};
use crate::validate::options::ValidatorOptions;
use crate::validate::{Check, Nested};
use crate::value::Value;

use std::collections::HashSet;
use std::sync::Arc;

pub(super) fn compile(facets: &ArrayFacets, options: &ValidatorOptions) -> Arc<Check> {
    let items = facets.items.as_ref().map(|t| Nested::new(t, options));
    let unique = facets.unique_items.unwrap_or(false);
    let min_items = facets.min_items;
    let max_items = facets.max_items;
    let wrap = options.coerce_types || !options.strict_types;
    let dedupe = options.coerce_types;
    let max_errors = options.max_errors_per_array.max(1);

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let wrapped;
        let input: &[Value] = match value {
            Value::Array(a) => a.as_slice(),
            _ if wrap => {
                wrapped = [value.clone()];
                &wrapped[..]
            }
            _ => {
                ctx.report(ValidationError::InvalidType {
                    path: ctx.path(),
                    expected: "array".to_string(),
                    actual: value.clone(),
                });
                return None;
            }
        };

        let mut output = Vec::with_capacity(input.len());
        // Items are compared by their JSON text once validated.
        let mut seen = HashSet::new();
        let mut failures = 0;
        for (idx, item) in input.iter().enumerate() {
            if failures >= max_errors || ctx.aborted() {
                break;
            }
            let validated = match &items {
                Some(v) => ctx.at_index(idx, |ctx| v.run(item, ctx)),
                None => Some(item.clone()),
            };
            let Some(validated) = validated else {
                failures += 1;
                continue;
            };
            if unique && !seen.insert(validated.to_string()) {
                if dedupe {
                    continue;
                }
                ctx.at_index(idx, |ctx| {
                    ctx.report(ValidationError::DuplicateItem {
                        path: ctx.path(),
                        actual: validated.clone(),
                    })
                });
                failures += 1;
                continue;
            }
            output.push(validated);
        }
        if failures > 0 {
            return None;
        }

        let count = output.len();
        if min_items.is_some_and(|min| count < min) || max_items.is_some_and(|max| count > max) {
            ctx.report(ValidationError::RangeError {
                path: ctx.path(),
                subject: RangeSubject::Items,
                actual: Value::from(count),
                min: min_items.map(Value::from),
                max: max_items.map(Value::from),
            });
            return None;
        }
        Some(Value::from(output))
    })
}
