// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // node callable adapters
pub mod config;     // engine config, parameters, validation
pub mod demo;       // ready-made workflows
pub mod engine;     // compiler + reactive executor
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // unified abstractions
pub mod workflow;   // declarations: parameters, nodes, references
