// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run start with executor configuration
//! * Run completion and failure
//! * Nodes abandoned after the run was cancelled

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A run started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionStarted<'a> {
    pub workflow: &'a str,
    pub run_id: &'a str,
    pub node_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting run of workflow '{}': {} nodes, max_concurrency={}",
            self.workflow, self.node_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            run_id = self.run_id,
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            workflow = self.workflow,
            run_id = self.run_id,
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// A run finished with every reachable node completed or skipped.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use flowlet::observability::messages::engine::ExecutionCompleted;
/// use std::time::Duration;
///
/// let msg = ExecutionCompleted {
///     workflow: "example",
///     executed: 5,
///     skipped: 1,
///     duration: Duration::from_millis(1500),
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Run of workflow 'example' completed: 5 executed, 1 skipped in 1.5s"
/// );
/// ```
pub struct ExecutionCompleted<'a> {
    pub workflow: &'a str,
    pub executed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run of workflow '{}' completed: {} executed, {} skipped in {:?}",
            self.workflow, self.executed, self.skipped, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            executed = self.executed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            workflow = self.workflow,
            executed = self.executed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
        )
    }
}

/// A run ended in failure.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ExecutionFailed<'a> {
    pub workflow: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Run of workflow '{}' failed: {}", self.workflow, self.error)
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "run_failed",
            span_name = name,
            workflow = self.workflow,
            error = %self.error,
        )
    }
}

/// A node stopped waiting because the run was cancelled.
///
/// # Log Level
/// `debug!` - Expected consequence of an earlier failure
pub struct NodeCancelled<'a> {
    pub node: &'a str,
}

impl Display for NodeCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' not started: run cancelled", self.node)
    }
}

impl StructuredLog for NodeCancelled<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node_cancelled", span_name = name, node = self.node)
    }
}
