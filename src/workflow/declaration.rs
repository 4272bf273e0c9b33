// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::workflow::node::{NodeDefinition, NodeHandle};
use crate::workflow::reference::{OutputRef, ParamRef};

/// Semantic type of a workflow parameter.
///
/// Used for documentation and export, and to validate runtime values before a
/// run admits any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Float,
    Str,
    Bool,
    Object,
    List,
    Any,
}

impl ValueType {
    /// Whether `value` is acceptable for a parameter of this type.
    ///
    /// Integers are accepted where floats are expected.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueType::Int => value.is_i64() || value.is_u64(),
            ValueType::Float => value.is_number(),
            ValueType::Str => value.is_string(),
            ValueType::Bool => value.is_boolean(),
            ValueType::Object => value.is_object(),
            ValueType::List => value.is_array(),
            ValueType::Any => true,
        }
    }

    /// Best-effort name of the JSON shape of `value`, for error messages.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "int",
            Value::String(_) => "str",
            Value::Array(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
            ValueType::Bool => "bool",
            ValueType::Object => "object",
            ValueType::List => "list",
            ValueType::Any => "any",
        };
        f.write_str(name)
    }
}

/// A named top-level workflow parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    pub name: String,
    pub value_type: ValueType,
    pub description: String,
}

/// A declaration set: the parameters of a workflow plus every node registered
/// against it.
///
/// Nodes are only part of the compiled graph when they are reachable from the
/// parameters by following references.
///
/// ```
/// use flowlet::backends::sync_fn;
/// use flowlet::workflow::{NodeDefinition, NodeOutput, ValueType, Workflow};
///
/// let mut wf = Workflow::new("doubler");
/// let x = wf.param("x", ValueType::Int, "value to double");
/// let double = wf.node(
///     NodeDefinition::new("double", sync_fn(|inputs, _log| {
///         Ok(NodeOutput::single(inputs.i64("x")? * 2))
///     }))
///     .input("x", x)
///     .output("result", "doubled value"),
/// );
/// assert_eq!(double.output("result").node, "double");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    name: String,
    parameters: Vec<ParameterDeclaration>,
    nodes: Vec<NodeDefinition>,
    designated_output: Option<OutputRef>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declare a parameter and get a reference to it.
    pub fn param(
        &mut self,
        name: impl Into<String>,
        value_type: ValueType,
        description: impl Into<String>,
    ) -> ParamRef {
        let name = name.into();
        self.parameters.push(ParameterDeclaration {
            name: name.clone(),
            value_type,
            description: description.into(),
        });
        ParamRef::new(name)
    }

    /// Register a node. The returned handle hands out references to the node's
    /// outputs before anything has executed.
    pub fn node(&mut self, definition: NodeDefinition) -> NodeHandle {
        let handle = NodeHandle::for_definition(&definition);
        self.nodes.push(definition);
        handle
    }

    /// Pick the output whose value a run returns as its final output.
    pub fn designate_output(&mut self, output: OutputRef) {
        self.designated_output = Some(output);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterDeclaration] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDeclaration> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn nodes(&self) -> &[NodeDefinition] {
        &self.nodes
    }

    pub fn designated_output(&self) -> Option<&OutputRef> {
        self.designated_output.as_ref()
    }
}
