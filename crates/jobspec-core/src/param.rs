//! Job parameter declarations and supplies.

use crate::validation::{FieldPath, Validate, Violations, check_not_empty, duplicate_indexes};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named parameter accepted by a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allow_empty: bool,
    #[serde(default)]
    pub kind: ParamType,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ParamSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            allow_empty: false,
            kind: ParamType::Text,
            default_value: None,
        }
    }

    pub fn with_kind(mut self, kind: ParamType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamType {
    #[default]
    Text,
    Boolean,
    Integer,
    Choice { choices: Vec<String> },
    Secret,
}

impl Validate for ParamSpec {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.name, path.field("name"), violations);

        if let ParamType::Choice { choices } = &self.kind {
            let choices_path = path.field("kind").field("choices");
            if choices.is_empty() {
                violations.push(choices_path.clone(), "At least one choice must be defined");
            }
            for (i, choice) in duplicate_indexes(choices.iter().map(String::as_str)) {
                violations.push(choices_path.index(i), format!("Duplicate choice: {}", choice));
            }
        }

        let Some(default) = &self.default_value else {
            return;
        };
        let default_path = path.field("default_value");
        match &self.kind {
            ParamType::Boolean if default != "true" && default != "false" => {
                violations.push(default_path, "Default value must be 'true' or 'false'");
            }
            ParamType::Integer if default.parse::<i64>().is_err() => {
                violations.push(default_path, format!("Not an integer: {}", default));
            }
            ParamType::Choice { choices } if !choices.contains(default) => {
                violations.push(default_path, format!("Not one of the choices: {}", default));
            }
            ParamType::Secret => {
                violations.push(default_path, "Secret parameters may not have a default value");
            }
            _ => {}
        }
    }
}

/// Values supplied for a parameter of another job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParamSupply {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub secret: bool,
}

impl Validate for ParamSupply {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.name, path.field("name"), violations);
        if self.secret && self.values.len() > 1 {
            violations.push(
                path.field("values"),
                "Secret parameters accept a single value",
            );
        }
    }
}

/// Check a list of supplies, including name uniqueness across the list.
pub fn check_supplies(supplies: &[ParamSupply], path: &FieldPath, violations: &mut Violations) {
    crate::validation::check_each(supplies, path, violations);
    for (i, name) in duplicate_indexes(supplies.iter().map(|s| s.name.as_str())) {
        violations.push(
            path.index(i).field("name"),
            format!("Duplicate param: {}", name),
        );
    }
}

/// Build a name-keyed lookup of `specs`.
///
/// No deduplication is done: a later spec with the same name replaces an
/// earlier one. Callers rely on validation having rejected duplicates.
pub fn param_spec_map(specs: &[ParamSpec]) -> HashMap<String, ParamSpec> {
    specs
        .iter()
        .map(|spec| (spec.name.clone(), spec.clone()))
        .collect()
}
