// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with typed fields attached.
//!
//! # Organization
//!
//! * `engine` - run lifecycle: start, completion, failure, cancellation
//! * `node` - per-node invocation and skip events
//! * `validation` - graph compilation results and problems
//!
//! # Usage Pattern
//!
//! ```rust
//! use flowlet::observability::messages::engine::ExecutionStarted;
//! use flowlet::observability::messages::StructuredLog;
//!
//! let msg = ExecutionStarted {
//!     workflow: "example",
//!     run_id: "4f1c",
//!     node_count: 5,
//!     max_concurrency: 4,
//! };
//!
//! msg.log();
//! assert!(msg.to_string().contains("5 nodes"));
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod engine;
pub mod node;
pub mod validation;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a `tracing` event at its level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
