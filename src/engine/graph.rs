// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::DependencyGraph;
use crate::workflow::{
    NodeDefinition, OutputDeclaration, OutputRef, ParameterDeclaration, Reference,
};

/// Immutable, validated dependency graph produced by [`compile`](crate::engine::compile).
///
/// Cheap to clone and safe to share across concurrent runs.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    inner: Arc<GraphInner>,
}

#[derive(Debug)]
struct GraphInner {
    workflow: String,
    parameters: Vec<ParameterDeclaration>,
    /// Reachable nodes in topological order
    nodes: Vec<NodeDefinition>,
    index: HashMap<String, usize>,
    dependents: DependencyGraph,
    upstream: HashMap<String, Vec<String>>,
    edges: Vec<(String, String)>,
    entry_points: Vec<String>,
    terminals: Vec<String>,
    designated_output: Option<OutputRef>,
}

impl CompiledGraph {
    /// Assemble a graph from already-validated, topologically ordered nodes.
    pub(crate) fn new(
        workflow: String,
        parameters: Vec<ParameterDeclaration>,
        nodes: Vec<NodeDefinition>,
        dependents: DependencyGraph,
        designated_output: Option<OutputRef>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();

        let reverse = dependents.build_reverse_dependencies();
        let position = |name: &str| -> usize {
            nodes
                .iter()
                .position(|n| n.name == name)
                .unwrap_or(usize::MAX)
        };

        // upstream lists follow topological order for stable iteration
        let upstream: HashMap<String, Vec<String>> = reverse
            .into_iter()
            .map(|(node, mut deps)| {
                deps.sort_by_key(|d| position(d));
                (node, deps)
            })
            .collect();

        let mut edges: Vec<(String, String)> = dependents
            .0
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from.clone(), to.clone())))
            .collect();
        edges.sort();

        let entry_points = nodes
            .iter()
            .filter(|n| upstream.get(&n.name).map_or(true, |deps| deps.is_empty()))
            .map(|n| n.name.clone())
            .collect();

        let terminals = nodes
            .iter()
            .filter(|n| {
                dependents
                    .get_dependents(&n.name)
                    .map_or(true, |deps| deps.is_empty())
            })
            .map(|n| n.name.clone())
            .collect();

        Self {
            inner: Arc::new(GraphInner {
                workflow,
                parameters,
                nodes,
                index,
                dependents,
                upstream,
                edges,
                entry_points,
                terminals,
                designated_output,
            }),
        }
    }

    /// Name of the workflow this graph was compiled from.
    pub fn workflow(&self) -> &str {
        &self.inner.workflow
    }

    pub fn parameters(&self) -> &[ParameterDeclaration] {
        &self.inner.parameters
    }

    /// Reachable nodes, in topological order.
    pub fn nodes(&self) -> &[NodeDefinition] {
        &self.inner.nodes
    }

    pub fn node(&self, name: &str) -> Option<&NodeDefinition> {
        self.inner.index.get(name).map(|&i| &self.inner.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }

    pub fn topological_order(&self) -> impl Iterator<Item = &str> {
        self.inner.nodes.iter().map(|n| n.name.as_str())
    }

    /// Nodes that read at least one output of `node`.
    pub fn dependents(&self, node: &str) -> &[String] {
        self.inner
            .dependents
            .get_dependents(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes whose outputs `node` reads.
    pub fn upstream(&self, node: &str) -> &[String] {
        self.inner
            .upstream
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(producer, consumer)` pairs, sorted.
    pub fn edges(&self) -> &[(String, String)] {
        &self.inner.edges
    }

    /// Nodes that read only parameters.
    pub fn entry_points(&self) -> &[String] {
        &self.inner.entry_points
    }

    /// Nodes nothing else reads from, in topological order.
    pub fn terminals(&self) -> &[String] {
        &self.inner.terminals
    }

    pub fn designated_output(&self) -> Option<&OutputRef> {
        self.inner.designated_output.as_ref()
    }

    /// Parameters some node reads through a mandatory input.
    pub fn mandatory_parameters(&self) -> BTreeSet<&str> {
        self.inner
            .nodes
            .iter()
            .flat_map(|n| n.inputs.iter())
            .filter(|(_, input)| !input.optional)
            .filter_map(|(_, input)| match &input.reference {
                Reference::Param(p) => Some(p.name.as_str()),
                Reference::Output(_) => None,
            })
            .collect()
    }

    /// Callable-free description of the graph, suitable for export.
    pub fn describe(&self) -> GraphDescription {
        GraphDescription {
            workflow: self.inner.workflow.clone(),
            parameters: self.inner.parameters.clone(),
            nodes: self.inner.nodes.iter().map(NodeDescription::from).collect(),
            edges: self
                .inner
                .edges
                .iter()
                .map(|(from, to)| EdgeDescription {
                    from: from.clone(),
                    to: to.clone(),
                })
                .collect(),
            entry_points: self.inner.entry_points.clone(),
            terminals: self.inner.terminals.clone(),
            designated_output: self.inner.designated_output.clone(),
        }
    }
}

/// Exportable structure of a compiled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub workflow: String,
    pub parameters: Vec<ParameterDeclaration>,
    pub nodes: Vec<NodeDescription>,
    pub edges: Vec<EdgeDescription>,
    pub entry_points: Vec<String>,
    pub terminals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designated_output: Option<OutputRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    pub description: String,
    pub inputs: Vec<InputDescription>,
    pub outputs: Vec<OutputDeclaration>,
    pub has_gate: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gate_reads: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDescription {
    pub name: String,
    pub reference: Reference,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDescription {
    pub from: String,
    pub to: String,
}

impl From<&NodeDefinition> for NodeDescription {
    fn from(node: &NodeDefinition) -> Self {
        Self {
            name: node.name.clone(),
            description: node.description.clone(),
            inputs: node
                .inputs
                .iter()
                .map(|(name, input)| InputDescription {
                    name: name.clone(),
                    reference: input.reference.clone(),
                    optional: input.optional,
                })
                .collect(),
            outputs: node.outputs.clone(),
            has_gate: node.gate.is_some(),
            gate_reads: node
                .gate
                .as_ref()
                .map(|g| g.reads().to_vec())
                .unwrap_or_default(),
        }
    }
}
