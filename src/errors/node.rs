// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Error returned by a node callable.
///
/// Any `NodeError` terminates the run; the executor wraps it together with the
/// failing node's name in [`crate::errors::ExecutionError::NodeFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NodeError {
    pub message: String,
}

impl NodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A mandatory input was not bound when the callable asked for it.
    pub fn missing_input(name: &str) -> Self {
        Self::new(format!("input '{}' is absent", name))
    }

    /// An input was bound to a value of the wrong shape.
    pub fn invalid_input(name: &str, expected: &str) -> Self {
        Self::new(format!("input '{}' is not a valid {}", name, expected))
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<anyhow::Error> for NodeError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

impl From<String> for NodeError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for NodeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
