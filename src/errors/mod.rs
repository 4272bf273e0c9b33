// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod compile;
mod config;
mod execution;
mod node;

pub use compile::CompileError;
pub use config::ConfigError;
pub use execution::{ExecutionError, RunFailure};
pub use node::NodeError;
