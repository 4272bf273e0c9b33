// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph compilation.
//!
//! This module contains message types for logging events related to:
//! * Cyclic dependency detection
//! * Unresolved references and output collisions
//! * Nodes dropped because no parameter reaches them
//! * Successful compilation

use crate::errors::CompileError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic dependency detected between nodes.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use flowlet::observability::messages::validation::CyclicDependencyDetected;
///
/// let cycle = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CyclicDependencyDetected { cycle: &cycle };
///
/// assert_eq!(msg.to_string(), "Cyclic dependency detected: a -> b -> a");
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A node references a parameter or output that does not exist.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedReference<'a> {
    pub node: &'a str,
    pub reference: &'a str,
}

impl Display for UnresolvedReference<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' references '{}' which does not exist",
            self.node, self.reference
        )
    }
}

impl StructuredLog for UnresolvedReference<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, reference = self.reference, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            node = self.node,
            reference = self.reference,
        )
    }
}

/// Two or more nodes declare the same output name.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateOutputDetected<'a> {
    pub output: &'a str,
    pub nodes: &'a [String],
}

impl Display for DuplicateOutputDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Output '{}' declared by multiple nodes: {}",
            self.output,
            self.nodes.join(", ")
        )
    }
}

impl StructuredLog for DuplicateOutputDetected<'_> {
    fn log(&self) {
        tracing::error!(
            output = self.output,
            nodes = self.nodes.join(", "),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            output = self.output,
            nodes = self.nodes.join(", "),
        )
    }
}

/// A node or parameter name was declared twice.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateName<'a> {
    pub kind: &'a str,
    pub name: &'a str,
}

impl Display for DuplicateName<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate {} name: '{}'", self.kind, self.name)
    }
}

impl StructuredLog for DuplicateName<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind, duplicate = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            kind = self.kind,
            duplicate = self.name,
        )
    }
}

/// A registered node is not reachable from any parameter and was dropped.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct UnreachableNodeDropped<'a> {
    pub node: &'a str,
}

impl Display for UnreachableNodeDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' is not reachable from any parameter; dropping it",
            self.node
        )
    }
}

impl StructuredLog for UnreachableNodeDropped<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("unreachable_node", span_name = name, node = self.node)
    }
}

/// Compilation finished.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use flowlet::observability::messages::validation::GraphCompiled;
///
/// let msg = GraphCompiled {
///     workflow: "example",
///     node_count: 6,
///     edge_count: 7,
///     dropped: 0,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Compiled workflow 'example': 6 nodes, 7 edges, 0 dropped"
/// );
/// ```
pub struct GraphCompiled<'a> {
    pub workflow: &'a str,
    pub node_count: usize,
    pub edge_count: usize,
    pub dropped: usize,
}

impl Display for GraphCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled workflow '{}': {} nodes, {} edges, {} dropped",
            self.workflow, self.node_count, self.edge_count, self.dropped
        )
    }
}

impl StructuredLog for GraphCompiled<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            node_count = self.node_count,
            edge_count = self.edge_count,
            dropped = self.dropped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "compile",
            span_name = name,
            workflow = self.workflow,
            node_count = self.node_count,
            edge_count = self.edge_count,
        )
    }
}

/// Emit the matching message for a compile error.
pub fn log_compile_error(error: &CompileError) {
    match error {
        CompileError::Cycle { nodes } => CyclicDependencyDetected { cycle: nodes }.log(),
        CompileError::UnresolvedReference { node, reference } => {
            UnresolvedReference { node, reference }.log()
        }
        CompileError::DuplicateOutput { output, nodes } => {
            DuplicateOutputDetected { output, nodes }.log()
        }
        CompileError::DuplicateNode { node } => DuplicateName {
            kind: "node",
            name: node,
        }
        .log(),
        CompileError::DuplicateParameter { parameter } => DuplicateName {
            kind: "parameter",
            name: parameter,
        }
        .log(),
    }
}
