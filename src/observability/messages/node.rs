// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-node events within a run.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A node's callable is about to be invoked.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use flowlet::observability::messages::node::NodeExecutionStarted;
///
/// let msg = NodeExecutionStarted {
///     node: "step1",
///     input_count: 1,
/// };
///
/// assert_eq!(msg.to_string(), "Invoking node 'step1' with 1 inputs");
/// ```
pub struct NodeExecutionStarted<'a> {
    pub node: &'a str,
    pub input_count: usize,
}

impl Display for NodeExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invoking node '{}' with {} inputs", self.node, self.input_count)
    }
}

impl StructuredLog for NodeExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, input_count = self.input_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node",
            span_name = name,
            node = self.node,
            input_count = self.input_count,
        )
    }
}

/// A node's callable returned successfully.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct NodeExecutionCompleted<'a> {
    pub node: &'a str,
    pub duration: Duration,
}

impl Display for NodeExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' completed in {:?}", self.node, self.duration)
    }
}

impl StructuredLog for NodeExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_completed",
            span_name = name,
            node = self.node,
            duration_ms = self.duration.as_millis() as u64,
        )
    }
}

/// A node's callable failed, or returned outputs not matching its declaration.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeExecutionFailed<'a> {
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for NodeExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' failed: {}", self.node, self.error)
    }
}

impl StructuredLog for NodeExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            node = self.node,
            error = %self.error,
        )
    }
}

/// A node was skipped.
///
/// # Log Level
/// `info!` - Skips are part of normal branching
///
/// # Example
/// ```
/// use flowlet::observability::messages::node::NodeSkipped;
///
/// let msg = NodeSkipped {
///     node: "merge",
///     reason: "upstream dependency skipped: step_a",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Skipping node 'merge': upstream dependency skipped: step_a"
/// );
/// ```
pub struct NodeSkipped<'a> {
    pub node: &'a str,
    pub reason: &'a str,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping node '{}': {}", self.node, self.reason)
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::info!(node = self.node, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_skipped",
            span_name = name,
            node = self.node,
            reason = self.reason,
        )
    }
}
