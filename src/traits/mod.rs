// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod callable;
pub mod executor;

pub use callable::NodeCallable;
pub use executor::{RunOutput, WorkflowExecutor};
