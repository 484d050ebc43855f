// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::Shape;
use crate::types::{effective_facets, Type, TypeNode};

use std::sync::OnceLock;

use dashmap::DashMap;
use log::trace;

impl Type {
    /// Expands the type into the concrete alternatives a value may match.
    ///
    /// A type without supertypes is its own alternative. A union stands for
    /// the concatenation of its members' alternatives. Any other type yields
    /// one alternative per combination of its supertypes' alternatives, with
    /// its own declared facets applied on top. Combinations of incompatible
    /// families cannot match anything and are dropped.
    pub fn flatten(&self) -> Vec<Type> {
        if let Shape::Union(u) = &self.own_shape {
            if !u.members.is_empty() {
                return u.members.iter().flat_map(|m| m.flatten()).collect();
            }
        }
        if self.supertypes.is_empty() {
            return vec![self.clone()];
        }

        let expanded: Vec<Vec<Type>> = self.supertypes.iter().map(|t| t.flatten()).collect();
        let unchanged = expanded
            .iter()
            .zip(self.supertypes.iter())
            .all(|(alts, st)| alts.len() == 1 && alts[0].ptr_eq(st));
        if unchanged {
            return vec![self.clone()];
        }

        let alternatives: Vec<Type> = cartesian_product(&expanded)
            .iter()
            .filter_map(|combination| self.specialize(combination))
            .collect();
        trace!(
            "flattened {} into {} alternative(s)",
            self.display_name(),
            alternatives.len()
        );
        alternatives
    }

    // The node re-derived from one combination of supertype alternatives.
    fn specialize(&self, combination: &[Type]) -> Option<Type> {
        let first = combination.first()?;
        let family = first.family();
        if !combination
            .iter()
            .all(|alt| family.is_compatible(alt.family()))
        {
            return None;
        }
        let (header, shape) =
            effective_facets(first.base, combination, &self.own_header, &self.own_shape);
        Some(Type::new(TypeNode {
            name: self.name.clone(),
            base: first.base,
            supertypes: vec![],
            header,
            shape,
            own_header: self.own_header.clone(),
            own_shape: self.own_shape.clone(),
            builtin: false,
            validators: DashMap::new(),
            target: OnceLock::new(),
        }))
    }
}

fn cartesian_product(lists: &[Vec<Type>]) -> Vec<Vec<Type>> {
    let mut product: Vec<Vec<Type>> = vec![vec![]];
    for list in lists {
        product = product
            .iter()
            .flat_map(|prefix| {
                list.iter().map(move |t| {
                    let mut combination = prefix.clone();
                    combination.push(t.clone());
                    combination
                })
            })
            .collect();
    }
    product
}
