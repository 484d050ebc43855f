// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::Shape;
use crate::types::Type;
use crate::validate::context::Context;
use crate::validate::error::ValidationError;
use crate::validate::options::ValidatorOptions;
use crate::validate::{Check, Validator};
use crate::value::Value;

use std::sync::Arc;

struct Candidate {
    // Side-effect free shape check, for objects that cannot be told apart
    // by a discriminator.
    precheck: Option<Validator>,
    validator: Validator,
}

fn needs_precheck(alternative: &Type) -> bool {
    matches!(&alternative.shape, Shape::Object(o) if o.discriminator.is_none())
}

/// First alternative that accepts the value wins.
pub(super) fn compile(alternatives: &[Type], options: &ValidatorOptions) -> Arc<Check> {
    let precheck_options = options.precheck();
    let candidates: Vec<Candidate> = alternatives
        .iter()
        .map(|alt| Candidate {
            precheck: needs_precheck(alt).then(|| alt.validator(&precheck_options)),
            validator: alt.validator(options),
        })
        .collect();

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let mut last_errors = vec![];
        for candidate in &candidates {
            if let Some(precheck) = &candidate.precheck {
                let mut trial = ctx.fork();
                precheck.run(value, &mut trial);
                if trial.has_errors() {
                    last_errors = trial.into_errors();
                    continue;
                }
            }
            let mut trial = ctx.fork();
            let output = candidate.validator.run(value, &mut trial);
            if !trial.has_errors() {
                return output;
            }
            last_errors = trial.into_errors();
        }

        if last_errors.is_empty() {
            ctx.report(ValidationError::NoUnionMemberMatched {
                path: ctx.path(),
                actual: value.clone(),
            });
        } else {
            ctx.extend(last_errors);
        }
        None
    })
}
