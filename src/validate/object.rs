// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::ObjectFacets;
use crate::types::Type;
use crate::validate::context::Context;
use crate::validate::error::{RangeSubject, ValidationError};
use crate::validate::options::{RemoveAdditional, ValidatorOptions};
use crate::validate::{Check, Nested};
use crate::value::{Map, Value};

use std::sync::Arc;

use indexmap::IndexMap;

struct Field {
    validator: Nested,
    // Already false when `ignore_required` covers the property.
    required: bool,
    // `ignore_required` covers the property.
    ignored: bool,
    has_default: bool,
}

pub(super) fn compile(node: &Type, facets: &ObjectFacets, options: &ValidatorOptions) -> Arc<Check> {
    let fields: IndexMap<Arc<str>, Field> = facets
        .properties
        .iter()
        .map(|(name, property)| {
            let ignored = options.ignore_required.covers(name);
            let field = Field {
                validator: Nested::new(&property.ty, options),
                required: property.ty.is_required() && !ignored,
                ignored,
                has_default: property.ty.header.default.is_some(),
            };
            (Arc::from(name.as_str()), field)
        })
        .collect();
    let discriminator = facets.discriminator.clone().map(|key| {
        let expected = facets
            .discriminator_value
            .clone()
            .or_else(|| node.name.clone())
            .unwrap_or_default();
        (key, expected)
    });
    let additional = facets.additional_properties.unwrap_or(true);
    let drop_unknown = match options.remove_additional {
        RemoveAdditional::No => false,
        RemoveAdditional::Yes => !additional,
        RemoveAdditional::All => true,
    };
    let min_properties = facets.min_properties;
    let max_properties = facets.max_properties;
    let max_errors = options.max_errors_per_object.max(1);

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let Value::Object(input) = value else {
            ctx.report(ValidationError::InvalidType {
                path: ctx.path(),
                expected: "object".to_string(),
                actual: value.clone(),
            });
            return None;
        };

        if let Some((key, expected)) = &discriminator {
            let actual = input.get(key.as_str()).cloned().unwrap_or(Value::Undefined);
            if actual.stringify().as_deref() != Some(expected.as_str()) {
                ctx.report(ValidationError::DiscriminatorMismatch {
                    path: ctx.path(),
                    discriminator: key.clone(),
                    expected: expected.clone(),
                    actual,
                });
                return None;
            }
        }

        let mut output = Map::with_capacity(input.len());
        let mut failures = 0;
        for (key, item) in input.iter() {
            if failures >= max_errors || ctx.aborted() {
                break;
            }
            if let Some(field) = fields.get(key.as_ref()) {
                // A missing value of an ignored property is kept as given.
                let validated = if field.ignored && item.is_missing() && !field.has_default {
                    Some(item.clone())
                } else {
                    ctx.at_key(key, |ctx| field.validator.run(item, ctx))
                };
                match validated {
                    Some(Value::Undefined) => (),
                    Some(v) => {
                        output.insert(key.clone(), v);
                    }
                    None => failures += 1,
                }
            } else if drop_unknown {
                continue;
            } else if additional {
                output.insert(key.clone(), item.clone());
            } else {
                ctx.report(ValidationError::NoAdditionalPropertiesAllowed {
                    path: ctx.path(),
                    property: key.to_string(),
                });
                failures += 1;
            }
        }

        // Declared properties the input does not have.
        for (name, field) in fields.iter() {
            if failures >= max_errors || ctx.aborted() {
                break;
            }
            if input.contains_key(name.as_ref()) || !(field.required || field.has_default) {
                continue;
            }
            match ctx.at_key(name, |ctx| field.validator.run(&Value::Undefined, ctx)) {
                Some(Value::Undefined) => (),
                Some(v) => {
                    output.insert(name.clone(), v);
                }
                None => failures += 1,
            }
        }
        if failures > 0 {
            return None;
        }

        let count = input.len();
        if min_properties.is_some_and(|min| count < min)
            || max_properties.is_some_and(|max| count > max)
        {
            ctx.report(ValidationError::RangeError {
                path: ctx.path(),
                subject: RangeSubject::Properties,
                actual: Value::from(count),
                min: min_properties.map(Value::from),
                max: max_properties.map(Value::from),
            });
            return None;
        }
        Some(Value::from(output))
    })
}
