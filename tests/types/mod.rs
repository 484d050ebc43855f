// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use typegraph::*;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Deserializer};
use test_generator::test_resources;

// Keeps an explicit `null` apart from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, Debug)]
struct ExpectedError {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    path: String,
    message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TestCase {
    note: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    options: ValidatorOptions,
    // Absent means the value is missing altogether.
    #[serde(default, deserialize_with = "present")]
    value: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    want_result: Option<Value>,
    want_errors: Option<Vec<ExpectedError>>,
    skip: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct YamlTest {
    #[serde(default)]
    types: Option<serde_yaml::Value>,
    want_load_error: Option<String>,
    #[serde(default)]
    cases: Vec<TestCase>,
}

fn check_errors(note: &str, actual: &[ValidationError], expected: &[ExpectedError]) -> Result<()> {
    if actual.len() != expected.len() {
        bail!(
            "{note}: expected {} error(s), got {}: {actual:?}",
            expected.len(),
            actual.len()
        );
    }
    for (a, e) in actual.iter().zip(expected.iter()) {
        if a.error_type() != e.error_type || a.path() != e.path {
            bail!(
                "{note}: expected {} at '{}', got {} at '{}'",
                e.error_type,
                e.path,
                a.error_type(),
                a.path()
            );
        }
        if let Some(message) = &e.message {
            let text = a.to_string();
            if !text.contains(message.as_str()) {
                bail!("{note}: `{text}` does not contain `{message}`");
            }
        }
    }
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    std::eprintln!("running {file}");

    let mut library = Library::new();
    if let Some(types) = &test.types {
        let loaded = library.add_types_from_yaml(&serde_yaml::to_string(types)?);
        match (loaded, &test.want_load_error) {
            (Ok(_), None) => (),
            (Err(actual), Some(expected)) => {
                if !actual.to_string().contains(expected.as_str()) {
                    bail!("`{actual}` does not contain `{expected}`");
                }
                return Ok(());
            }
            (Ok(_), Some(expected)) => bail!("types loaded but `{expected}` was expected"),
            (Err(actual), None) => bail!("failed to load types. {actual}"),
        }
    }

    for case in test.cases {
        std::print!("case {} ", case.note);
        if case.skip == Some(true) {
            std::println!("skipped");
            continue;
        }

        let t = library
            .get_type(&case.type_name)
            .ok_or_else(|| anyhow!("{}: unknown type {}", case.note, case.type_name))?;
        let validator = t.validator(&case.options);
        let input = case.value.unwrap_or(Value::Undefined);

        match (validator.validate(&input), case.want_result, case.want_errors) {
            (Ok(actual), Some(expected), None) => {
                if actual != expected {
                    bail!("{}: expected {expected}, got {actual}", case.note);
                }
            }
            (Ok(_), None, None) => (),
            (Err(actual), None, Some(expected)) => check_errors(&case.note, &actual, &expected)?,
            (actual, want_result, want_errors) => {
                bail!(
                    "{}: want_result = `{want_result:?}` want_errors = `{want_errors:?}` actual = {actual:?}",
                    case.note
                );
            }
        }

        std::eprintln!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/types/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
