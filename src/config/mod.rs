// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod loader;
mod params;
mod validation;

pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use loader::{load_config, Config, ExecutorOptions, LogFormat, LoggingOptions};
pub use params::ParameterValues;
pub use validation::validate_workflow;
