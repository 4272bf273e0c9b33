// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::traits::NodeCallable;
use crate::workflow::reference::{InputRef, OutputRef, Reference};
use crate::workflow::values::GateContext;

/// Predicate over already-resolved named values.
pub type GatePredicate = Arc<dyn Fn(&GateContext) -> bool + Send + Sync>;

/// A gating condition attached to a node.
///
/// Besides the node's own inputs, a gate may read extra references (for example a
/// routing value computed upstream). Each read becomes a dependency edge, so the
/// gate is only evaluated once those producers have finished.
#[derive(Clone)]
pub struct Gate {
    reads: Vec<Reference>,
    predicate: GatePredicate,
}

impl Gate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&GateContext) -> bool + Send + Sync + 'static,
    {
        Self {
            reads: Vec::new(),
            predicate: Arc::new(predicate),
        }
    }

    /// Make an extra reference visible to the predicate.
    pub fn reading(mut self, reference: impl Into<Reference>) -> Self {
        self.reads.push(reference.into());
        self
    }

    pub fn reads(&self) -> &[Reference] {
        &self.reads
    }

    pub fn evaluate(&self, ctx: &GateContext) -> bool {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate").field("reads", &self.reads).finish()
    }
}

/// A declared node output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDeclaration {
    pub name: String,
    pub description: String,
}

/// Declaration of one computation step.
#[derive(Clone)]
pub struct NodeDefinition {
    pub name: String,
    pub description: String,
    pub inputs: Vec<(String, InputRef)>,
    pub outputs: Vec<OutputDeclaration>,
    pub gate: Option<Gate>,
    pub callable: Arc<dyn NodeCallable>,
}

impl NodeDefinition {
    pub fn new(name: impl Into<String>, callable: Arc<dyn NodeCallable>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            gate: None,
            callable,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Bind the callable's input `name` to a parameter, an output, or an
    /// `optional(..)` wrapped reference.
    pub fn input(mut self, name: impl Into<String>, reference: impl Into<InputRef>) -> Self {
        self.inputs.push((name.into(), reference.into()));
        self
    }

    pub fn output(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.outputs.push(OutputDeclaration {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn when(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn declares_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|o| o.name == name)
    }

    /// Every reference this node reads: inputs first, then gate reads.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.inputs
            .iter()
            .map(|(_, input)| &input.reference)
            .chain(self.gate.iter().flat_map(|g| g.reads().iter()))
    }

    /// Distinct names of the nodes whose outputs this node reads.
    pub fn upstream_nodes(&self) -> BTreeSet<&str> {
        self.references().filter_map(Reference::producer).collect()
    }
}

impl fmt::Debug for NodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDefinition")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("gate", &self.gate)
            .finish()
    }
}

/// Returned by [`crate::workflow::Workflow::node`]; hands out output references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    name: String,
    outputs: Vec<String>,
}

impl NodeHandle {
    pub(crate) fn for_definition(definition: &NodeDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            outputs: definition.outputs.iter().map(|o| o.name.clone()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference to one of this node's outputs.
    ///
    /// Undeclared names still produce a reference; compilation reports them as
    /// unresolved.
    pub fn output(&self, name: &str) -> OutputRef {
        OutputRef::new(self.name.clone(), name)
    }

    pub fn output_names(&self) -> &[String] {
        &self.outputs
    }
}
