// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors that can occur while compiling a workflow into an executable graph.
///
/// All of these are fatal to compilation. No partial graph is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A circular dependency was detected among node references
    #[error("Cyclic dependency detected: {}", nodes.join(" -> "))]
    Cycle {
        /// The cycle path, closed by repeating its first node
        nodes: Vec<String>,
    },

    /// Two or more nodes declare the same output name
    #[error("Output '{output}' is declared by more than one node: {}", nodes.join(", "))]
    DuplicateOutput { output: String, nodes: Vec<String> },

    /// An input (or gate read) points at an undeclared parameter or a never-produced output
    #[error("Node '{node}' references '{reference}' which does not exist")]
    UnresolvedReference { node: String, reference: String },

    /// Two nodes were registered under the same name
    #[error("Duplicate node name: '{node}'")]
    DuplicateNode { node: String },

    /// A parameter name was declared twice
    #[error("Duplicate parameter name: '{parameter}'")]
    DuplicateParameter { parameter: String },
}

impl CompileError {
    /// Short, stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Cycle { .. } => "cycle",
            CompileError::DuplicateOutput { .. } => "duplicate_output",
            CompileError::UnresolvedReference { .. } => "unresolved_reference",
            CompileError::DuplicateNode { .. } => "duplicate_node",
            CompileError::DuplicateParameter { .. } => "duplicate_parameter",
        }
    }
}
