// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::validate::error::ValidationError;

use std::sync::Arc;

#[derive(Debug, Clone)]
enum Segment {
    Key(Arc<str>),
    Index(usize),
}

/// Per-call state threaded through compiled validators: where we are in the
/// value and what went wrong so far.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    segments: Vec<Segment>,
    errors: Vec<ValidationError>,
    first_error_only: bool,
}

impl Context {
    pub(crate) fn new(first_error_only: bool) -> Self {
        Self {
            segments: vec![],
            errors: vec![],
            first_error_only,
        }
    }

    /// Fresh error list at the same location. Used to try union alternatives.
    pub(crate) fn fork(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            errors: vec![],
            first_error_only: self.first_error_only,
        }
    }

    /// Dotted path of the current location, e.g. `orders[2].lines[0].sku`.
    pub(crate) fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Key(k) => {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(k);
                }
                Segment::Index(i) => {
                    path.push('[');
                    path.push_str(&i.to_string());
                    path.push(']');
                }
            }
        }
        path
    }

    pub(crate) fn report(&mut self, error: ValidationError) {
        if !self.aborted() {
            self.errors.push(error);
        }
    }

    pub(crate) fn extend(&mut self, errors: Vec<ValidationError>) {
        for e in errors {
            self.report(e);
        }
    }

    /// Set once the first error is in and the caller asked to stop there.
    pub(crate) fn aborted(&self) -> bool {
        self.first_error_only && !self.errors.is_empty()
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    pub(crate) fn at_key<R>(&mut self, key: &Arc<str>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.segments.push(Segment::Key(key.clone()));
        let r = f(self);
        self.segments.pop();
        r
    }

    pub(crate) fn at_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.segments.push(Segment::Index(index));
        let r = f(self);
        self.segments.pop();
        r
    }
}
