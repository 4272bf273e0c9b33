// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::engine::RunContext;
use crate::errors::NodeError;
use crate::workflow::ValueType;

/// Errors that end a workflow run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// A node callable returned an error
    #[error("Node '{node}' failed: {error}")]
    NodeFailed { node: String, error: NodeError },

    /// A mandatory parameter had no value supplied for this run
    #[error("Missing value for parameter '{parameter}'")]
    MissingParameter { parameter: String },

    /// A supplied parameter value does not match its declared type
    #[error("Parameter '{parameter}' expects {expected}, got {actual}")]
    InvalidParameter {
        parameter: String,
        expected: ValueType,
        actual: String,
    },

    /// A callable's result does not match the node's declared outputs
    #[error("Node '{node}' returned outputs that do not match its declaration: {detail}")]
    OutputMismatch { node: String, detail: String },

    /// Invariant violation inside the executor
    #[error("Internal executor error: {message}")]
    Internal { message: String },
}

impl ExecutionError {
    /// Name of the node the error originated from, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            ExecutionError::NodeFailed { node, .. } | ExecutionError::OutputMismatch { node, .. } => {
                Some(node)
            }
            _ => None,
        }
    }
}

/// Terminal failed outcome of a run.
///
/// Carries the context accumulated up to the failure so that timings and logs of
/// nodes that were already running are not lost.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: ExecutionError,
    pub context: RunContext,
}
