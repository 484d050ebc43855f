// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::*;
use crate::types::{Type, TypeNode};

/// How a source's facets are folded into a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeMode {
    /// Supertype facets: fill gaps, keep what the target already has.
    Inherit,
    /// A type's own facets: replace singular facets, combine bounds.
    Refine,
    /// Replace every facet the source defines.
    Overwrite,
}

/// Returns a copy of `target` whose effective facets have `source`'s merged in.
///
/// The result keeps the target's name, base type, supertypes and declared
/// facets. Neither input is modified.
pub fn merge(target: &Type, source: &Type, mode: MergeMode) -> Type {
    let mut header = target.header.clone();
    let mut shape = target.shape.clone();
    header.merge(&source.header, mode);
    shape.merge(&source.shape, mode);
    Type::new(TypeNode {
        name: target.name.clone(),
        base: target.base,
        supertypes: target.supertypes.clone(),
        header,
        shape,
        own_header: target.own_header.clone(),
        own_shape: target.own_shape.clone(),
        builtin: false,
        validators: Default::default(),
        target: Default::default(),
    })
}

fn singular<T: Clone>(target: &mut Option<T>, source: &Option<T>, mode: MergeMode) {
    match mode {
        MergeMode::Inherit => {
            if target.is_none() {
                target.clone_from(source);
            }
        }
        MergeMode::Refine | MergeMode::Overwrite => {
            if source.is_some() {
                target.clone_from(source);
            }
        }
    }
}

fn lower_bound<T: Clone + PartialOrd>(target: &mut Option<T>, source: &Option<T>, mode: MergeMode) {
    let Some(s) = source else {
        return;
    };
    match target {
        Some(t) if mode != MergeMode::Overwrite && *t <= *s => (),
        _ => *target = Some(s.clone()),
    }
}

fn upper_bound<T: Clone + PartialOrd>(target: &mut Option<T>, source: &Option<T>, mode: MergeMode) {
    let Some(s) = source else {
        return;
    };
    match target {
        Some(t) if mode != MergeMode::Overwrite && *t >= *s => (),
        _ => *target = Some(s.clone()),
    }
}

fn append<T: Clone + PartialEq>(target: &mut Vec<T>, source: &[T]) {
    for item in source {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

impl Header {
    pub fn merge(&mut self, source: &Header, mode: MergeMode) {
        singular(&mut self.description, &source.description, mode);
        singular(&mut self.required, &source.required, mode);
        singular(&mut self.default, &source.default, mode);
        singular(&mut self.type_of, &source.type_of, mode);
        for (k, v) in &source.annotations {
            if mode == MergeMode::Inherit && self.annotations.contains_key(k) {
                continue;
            }
            self.annotations.insert(k.clone(), v.clone());
        }
    }
}

impl StringFacets {
    pub fn merge(&mut self, source: &StringFacets, mode: MergeMode) {
        append(&mut self.enum_values, &source.enum_values);
        append(&mut self.patterns, &source.patterns);
        lower_bound(&mut self.min_length, &source.min_length, mode);
        upper_bound(&mut self.max_length, &source.max_length, mode);
    }
}

impl NumberFacets {
    pub fn merge(&mut self, source: &NumberFacets, mode: MergeMode) {
        append(&mut self.enum_values, &source.enum_values);
        singular(&mut self.format, &source.format, mode);
        singular(&mut self.multiple_of, &source.multiple_of, mode);
        lower_bound(&mut self.minimum, &source.minimum, mode);
        upper_bound(&mut self.maximum, &source.maximum, mode);
    }
}

impl DateFacets {
    pub fn merge(&mut self, source: &DateFacets, mode: MergeMode) {
        singular(&mut self.format, &source.format, mode);
    }
}

impl ArrayFacets {
    pub fn merge(&mut self, source: &ArrayFacets, mode: MergeMode) {
        singular(&mut self.items, &source.items, mode);
        singular(&mut self.unique_items, &source.unique_items, mode);
        lower_bound(&mut self.min_items, &source.min_items, mode);
        upper_bound(&mut self.max_items, &source.max_items, mode);
    }
}

impl ObjectFacets {
    pub fn merge(&mut self, source: &ObjectFacets, mode: MergeMode) {
        for (name, property) in &source.properties {
            match mode {
                MergeMode::Inherit => {
                    if !self.properties.contains_key(name) {
                        self.properties.insert(
                            name.clone(),
                            Property {
                                ty: property.ty.clone(),
                                inherited: true,
                            },
                        );
                    }
                }
                // An existing key keeps its position.
                MergeMode::Refine | MergeMode::Overwrite => {
                    self.properties.insert(name.clone(), property.clone());
                }
            }
        }
        singular(
            &mut self.additional_properties,
            &source.additional_properties,
            mode,
        );
        singular(&mut self.discriminator, &source.discriminator, mode);
        singular(
            &mut self.discriminator_value,
            &source.discriminator_value,
            mode,
        );
        lower_bound(&mut self.min_properties, &source.min_properties, mode);
        upper_bound(&mut self.max_properties, &source.max_properties, mode);
    }
}

impl UnionFacets {
    pub fn merge(&mut self, source: &UnionFacets, mode: MergeMode) {
        if source.members.is_empty() {
            return;
        }
        if mode != MergeMode::Inherit || self.members.is_empty() {
            self.members.clone_from(&source.members);
        }
    }
}

impl Shape {
    /// Merges family facets. Shapes of different families leave `self` untouched.
    pub fn merge(&mut self, source: &Shape, mode: MergeMode) {
        match (self, source) {
            (Shape::String(t), Shape::String(s)) => t.merge(s, mode),
            (Shape::Number(t), Shape::Number(s)) => t.merge(s, mode),
            (Shape::Date(t), Shape::Date(s)) => t.merge(s, mode),
            (Shape::Array(t), Shape::Array(s)) => t.merge(s, mode),
            (Shape::Object(t), Shape::Object(s)) => t.merge(s, mode),
            (Shape::Union(t), Shape::Union(s)) => t.merge(s, mode),
            _ => (),
        }
    }
}
