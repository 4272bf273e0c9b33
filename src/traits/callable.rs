// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::NodeLogger;
use crate::errors::NodeError;
use crate::workflow::{NodeInputs, NodeOutput};

/// The code behind a node.
///
/// Implementations may complete without suspending (synchronous work) or await
/// timers and I/O; the executor treats both uniformly as tasks. Any error ends
/// the run.
#[async_trait]
pub trait NodeCallable: Send + Sync {
    async fn call(&self, inputs: NodeInputs, log: NodeLogger) -> Result<NodeOutput, NodeError>;
}
