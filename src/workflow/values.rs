// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime value containers handed to node callables and gate predicates.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::NodeError;

/// Inputs gathered for one node invocation, in declaration order.
///
/// An input bound to `None` is explicitly absent: its optional producer was
/// skipped or an optional parameter had no value for this run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInputs {
    values: Vec<(String, Option<Value>)>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.values.push((name.into(), value));
    }

    /// Value bound to `name`, or `None` if absent or not declared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn is_absent(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    pub fn require(&self, name: &str) -> Result<&Value, NodeError> {
        self.get(name).ok_or_else(|| NodeError::missing_input(name))
    }

    /// Deserialize an input that must be present.
    pub fn require_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, NodeError> {
        let value = self.require(name)?;
        serde_json::from_value(value.clone())
            .map_err(|_| NodeError::invalid_input(name, std::any::type_name::<T>()))
    }

    /// Deserialize an input that may be absent.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, NodeError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| NodeError::invalid_input(name, std::any::type_name::<T>())),
        }
    }

    pub fn i64(&self, name: &str) -> Result<i64, NodeError> {
        self.require(name)?
            .as_i64()
            .ok_or_else(|| NodeError::invalid_input(name, "integer"))
    }

    pub fn f64(&self, name: &str) -> Result<f64, NodeError> {
        self.require(name)?
            .as_f64()
            .ok_or_else(|| NodeError::invalid_input(name, "number"))
    }

    pub fn str(&self, name: &str) -> Result<&str, NodeError> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| NodeError::invalid_input(name, "string"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a node callable produces.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    /// A single value, only valid for nodes declaring exactly one output.
    Single(Value),
    /// One value per declared output name.
    Named(BTreeMap<String, Value>),
}

impl NodeOutput {
    pub fn single(value: impl Into<Value>) -> Self {
        NodeOutput::Single(value.into())
    }

    pub fn named<K, V, I>(values: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        NodeOutput::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Named values visible to a gate predicate.
///
/// Holds the node's gathered inputs (by local input name) plus every value the
/// gate declared it reads (by parameter or output name). Absent values are
/// omitted rather than bound to null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateContext {
    values: BTreeMap<String, Value>,
}

impl GateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}
