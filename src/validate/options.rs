// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use std::collections::BTreeSet;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Handling of object keys that are not declared as properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RemoveAdditional {
    /// Keep them when `additionalProperties` allows it, report them otherwise.
    #[default]
    No,
    /// Drop them silently where `additionalProperties` is false.
    Yes,
    /// Drop every undeclared key.
    All,
}

impl<'de> Deserialize<'de> for RemoveAdditional {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Mode(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => Ok(RemoveAdditional::No),
            Repr::Flag(true) => Ok(RemoveAdditional::Yes),
            Repr::Mode(m) if m == "all" => Ok(RemoveAdditional::All),
            Repr::Mode(m) => Err(de::Error::custom(format!(
                "removeAdditional must be true, false or \"all\", found \"{m}\""
            ))),
        }
    }
}

/// Properties whose `required` facet is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum IgnoreRequired {
    #[default]
    None,
    All,
    /// Property or type names.
    Names(BTreeSet<String>),
}

impl IgnoreRequired {
    pub fn covers(&self, name: &str) -> bool {
        match self {
            IgnoreRequired::None => false,
            IgnoreRequired::All => true,
            IgnoreRequired::Names(names) => names.contains(name),
        }
    }
}

impl<'de> Deserialize<'de> for IgnoreRequired {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Names(BTreeSet<String>),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => IgnoreRequired::None,
            Repr::Flag(true) => IgnoreRequired::All,
            Repr::Names(names) => IgnoreRequired::Names(names),
        })
    }
}

/// Knobs of a compiled validator.
///
/// Options are part of the validator cache key, so two equal option sets
/// share one compiled validator per type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Require values of the exact native kind (no numeric strings, no `"true"`).
    pub strict_types: bool,
    /// Return the coerced form of scalars (stringified, parsed, canonical dates).
    pub coerce_types: bool,
    /// Turn date strings into native date-times.
    pub coerce_native_types: bool,
    pub remove_additional: RemoveAdditional,
    pub ignore_required: IgnoreRequired,
    /// Stop at the first error anywhere in the value.
    pub throw_on_first_error: bool,
    /// Failing properties reported per object before it gives up.
    pub max_errors_per_object: usize,
    /// Failing items reported per array before it gives up.
    pub max_errors_per_array: usize,
    /// Skip the calendar check. February 29 of a non-leap year is then accepted.
    pub fast_date_validation: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            strict_types: false,
            coerce_types: false,
            coerce_native_types: false,
            remove_additional: RemoveAdditional::No,
            ignore_required: IgnoreRequired::None,
            throw_on_first_error: false,
            max_errors_per_object: 1,
            max_errors_per_array: 1,
            fast_date_validation: false,
        }
    }
}

impl ValidatorOptions {
    pub fn strict() -> Self {
        Self {
            strict_types: true,
            ..Self::default()
        }
    }

    pub fn coercing() -> Self {
        Self {
            coerce_types: true,
            ..Self::default()
        }
    }

    /// Options of the side-effect free shape check run before an object
    /// union alternative is validated for real. Types are always strict, so
    /// an alternative that would only match after coercion is passed over.
    pub(crate) fn precheck(&self) -> Self {
        Self {
            strict_types: true,
            coerce_types: false,
            coerce_native_types: false,
            remove_additional: RemoveAdditional::No,
            ignore_required: self.ignore_required.clone(),
            throw_on_first_error: true,
            max_errors_per_object: 1,
            max_errors_per_array: 1,
            fast_date_validation: self.fast_date_validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_from_configuration() {
        let options: ValidatorOptions = serde_json::from_str(
            r#"{"strictTypes": true, "removeAdditional": "all", "ignoreRequired": ["id"]}"#,
        )
        .unwrap();
        assert!(options.strict_types);
        assert_eq!(options.remove_additional, RemoveAdditional::All);
        assert!(options.ignore_required.covers("id"));
        assert!(!options.ignore_required.covers("name"));
        assert_eq!(options.max_errors_per_object, 1);
    }

    #[test]
    fn boolean_forms() {
        let options: ValidatorOptions =
            serde_json::from_str(r#"{"removeAdditional": true, "ignoreRequired": true}"#).unwrap();
        assert_eq!(options.remove_additional, RemoveAdditional::Yes);
        assert_eq!(options.ignore_required, IgnoreRequired::All);
        assert!(serde_json::from_str::<ValidatorOptions>(r#"{"removeAdditional": "some"}"#).is_err());
    }

    #[test]
    fn precheck_is_strict_and_never_mutates() {
        let options = ValidatorOptions {
            coerce_types: true,
            coerce_native_types: true,
            remove_additional: RemoveAdditional::All,
            max_errors_per_object: 10,
            ..ValidatorOptions::default()
        };
        let precheck = options.precheck();
        assert!(!precheck.coerce_types && !precheck.coerce_native_types);
        assert_eq!(precheck.remove_additional, RemoveAdditional::No);
        assert!(precheck.throw_on_first_error);
        assert!(precheck.strict_types);
        assert_eq!(precheck.max_errors_per_object, 1);
    }
}
