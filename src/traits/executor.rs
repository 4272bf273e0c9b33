// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ParameterValues;
use crate::engine::{CompiledGraph, RunContext};
use crate::errors::RunFailure;

/// Completed run context plus the run's final output value, if any.
pub type RunOutput = (RunContext, Option<Value>);

#[async_trait]
pub trait WorkflowExecutor: Send + Sync {
    /// Execute a compiled graph against concrete parameter values.
    ///
    /// - `graph`: shared, read-only compiled graph; may be reused across runs
    /// - `params`: runtime parameter values keyed by parameter name
    ///
    /// Returns either:
    /// - Ok((RunContext, final output)): every reachable node completed or was skipped
    /// - Err(RunFailure): the first failure plus the context gathered up to that point
    async fn run(&self, graph: &CompiledGraph, params: ParameterValues) -> Result<RunOutput, RunFailure>;
}
