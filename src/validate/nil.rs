// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::validate::context::Context;
use crate::validate::error::ValidationError;
use crate::validate::Check;
use crate::value::Value;

use std::sync::Arc;

// Missing values never get here: the nil header always defaults to null.
pub(super) fn compile() -> Arc<Check> {
    Arc::new(|value: &Value, ctx: &mut Context| {
        ctx.report(ValidationError::InvalidType {
            path: ctx.path(),
            expected: "nil".to_string(),
            actual: value.clone(),
        });
        None
    })
}
