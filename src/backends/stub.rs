// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::NodeLogger;
use crate::errors::NodeError;
use crate::traits::NodeCallable;
use crate::workflow::{NodeInputs, NodeOutput};

/// A node that always returns the same value
pub struct ConstantNode {
    pub value: Value,
}

impl ConstantNode {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

#[async_trait]
impl NodeCallable for ConstantNode {
    async fn call(&self, _inputs: NodeInputs, _log: NodeLogger) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::Single(self.value.clone()))
    }
}

/// Suspends for `delay`, then returns its first input (or null)
pub struct SleepNode {
    pub delay: Duration,
}

impl SleepNode {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl NodeCallable for SleepNode {
    async fn call(&self, inputs: NodeInputs, log: NodeLogger) -> Result<NodeOutput, NodeError> {
        log.info(format!("sleep {:?}", self.delay));
        tokio::time::sleep(self.delay).await;
        let first = inputs.iter().find_map(|(_, v)| v.cloned()).unwrap_or(Value::Null);
        Ok(NodeOutput::Single(first))
    }
}

/// A node that always fails, optionally after suspending
pub struct FailingNode {
    pub delay: Duration,
}

impl FailingNode {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    pub fn after(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl NodeCallable for FailingNode {
    async fn call(&self, _inputs: NodeInputs, _log: NodeLogger) -> Result<NodeOutput, NodeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Err(NodeError::new("Simulated node failure"))
    }
}

/// Counts invocations; used to prove a callable was never run
pub struct CountingNode {
    pub calls: Arc<AtomicUsize>,
}

impl CountingNode {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl NodeCallable for CountingNode {
    async fn call(&self, _inputs: NodeInputs, _log: NodeLogger) -> Result<NodeOutput, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(NodeOutput::Single(Value::Null))
    }
}
