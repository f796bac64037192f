//! # Environments & Variables
//!
//! Environment definitions live in a dedicated directory and are picked by
//! file name. Variables from the environment override collection variables,
//! and `{{variable}}` placeholders are interpolated before a request is sent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::collections::CollectionVariable;

/// A Postman environment export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<Variable>,
}

/// A single environment variable.
#[derive(Debug, Clone, Deserialize)]
pub struct Variable {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Environment {
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }
}

/// Location of the environment definition called `env_file_name`.
pub fn environment_path(environment_dir: &Path, env_file_name: &str) -> PathBuf {
    environment_dir.join(env_file_name)
}

/// Render a variable value the way it is substituted into requests.
pub fn variable_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Merge collection and environment variables.
/// Priority: environment variables override collection variables.
pub fn build_variable_map(
    collection_variables: &[CollectionVariable],
    environment: &Environment,
) -> HashMap<String, String> {
    let mut variables = HashMap::new();

    for v in collection_variables {
        if !v.disabled && !v.key.is_empty() {
            variables.insert(v.key.clone(), v.value_string());
        }
    }

    for v in &environment.values {
        if v.enabled && !v.key.is_empty() {
            variables.insert(v.key.clone(), variable_value(&v.value));
        }
    }

    variables
}

/// How deep a variable value may refer to other variables.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Interpolate `{{key}}` placeholders in a string. Unknown placeholders are left as-is.
///
/// Placeholders are resolved left to right. A value that contains placeholders
/// itself is expanded in turn, up to [`MAX_INTERPOLATION_DEPTH`] levels.
pub fn interpolate(input: &str, variables: &HashMap<String, String>) -> String {
    expand(input, variables, 0)
}

fn expand(input: &str, variables: &HashMap<String, String>, depth: usize) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = &after[..end];
        match variables.get(key) {
            Some(value) if depth < MAX_INTERPOLATION_DEPTH => {
                result.push_str(&expand(value, variables, depth + 1));
            }
            Some(value) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}
