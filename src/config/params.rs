// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::env;

use crate::config::consts::WORKFLOW_PARAM_ENV;
use crate::errors::ConfigError;

/// Concrete parameter values for one run, keyed by parameter name.
///
/// # Example
/// ```
/// use flowlet::config::ParameterValues;
///
/// let params = ParameterValues::from_json_str(r#"{"a": 3, "b": -1}"#).unwrap();
/// assert_eq!(params.get("a"), Some(&serde_json::json!(3)));
///
/// let built = ParameterValues::new().with("a", 3).with("b", -1);
/// assert_eq!(built, params);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterValues(HashMap<String, Value>);

impl ParameterValues {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a JSON object of `name: value` pairs.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(ConfigError::Parameters(format!(
                "expected a JSON object, got {}",
                crate::workflow::ValueType::describe(&other)
            ))),
        }
    }

    /// Read parameters from `WORKFLOW_PARAM`. An unset or blank variable
    /// yields `Ok(None)` so callers can fall back to defaults.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_env_var(WORKFLOW_PARAM_ENV)
    }

    pub fn from_env_var(key: &str) -> Result<Option<Self>, ConfigError> {
        match env::var(key) {
            Ok(raw) if !raw.trim().is_empty() => Self::from_json_str(&raw).map(Some),
            Ok(_) | Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::Parameters(format!(
                "{} is not valid unicode",
                key
            ))),
        }
    }
}

impl From<HashMap<String, Value>> for ParameterValues {
    fn from(values: HashMap<String, Value>) -> Self {
        Self(values)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
