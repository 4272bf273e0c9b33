// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

use crate::engine::NodeLogger;
use crate::errors::NodeError;
use crate::traits::NodeCallable;
use crate::workflow::{NodeInputs, NodeOutput};

type SyncBody = dyn Fn(&NodeInputs, &NodeLogger) -> Result<NodeOutput, NodeError> + Send + Sync;
type AsyncBody =
    dyn Fn(NodeInputs, NodeLogger) -> BoxFuture<'static, Result<NodeOutput, NodeError>> + Send + Sync;

/// Synchronous closure node. Runs to completion without suspending.
pub struct SyncFn {
    body: Box<SyncBody>,
}

#[async_trait]
impl NodeCallable for SyncFn {
    async fn call(&self, inputs: NodeInputs, log: NodeLogger) -> Result<NodeOutput, NodeError> {
        (self.body)(&inputs, &log)
    }
}

/// Asynchronous closure node. May suspend on timers or I/O.
pub struct AsyncFn {
    body: Box<AsyncBody>,
}

#[async_trait]
impl NodeCallable for AsyncFn {
    async fn call(&self, inputs: NodeInputs, log: NodeLogger) -> Result<NodeOutput, NodeError> {
        (self.body)(inputs, log).await
    }
}

/// Wrap a closure that computes its outputs without suspending.
///
/// The closure runs inline on the runtime worker that admitted the node. On a
/// `current_thread` runtime a CPU-heavy body holds back every other ready node
/// until it returns; move such work into an `async_fn` body that awaits
/// `tokio::task::spawn_blocking`.
pub fn sync_fn<F>(body: F) -> Arc<dyn NodeCallable>
where
    F: Fn(&NodeInputs, &NodeLogger) -> Result<NodeOutput, NodeError> + Send + Sync + 'static,
{
    Arc::new(SyncFn {
        body: Box::new(body),
    })
}

pub fn async_fn<F, Fut>(body: F) -> Arc<dyn NodeCallable>
where
    F: Fn(NodeInputs, NodeLogger) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<NodeOutput, NodeError>> + Send + 'static,
{
    Arc::new(AsyncFn {
        body: Box::new(move |inputs, log| body(inputs, log).boxed()),
    })
}
