// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability: structured log messages and subscriber setup.
//!
//! Message types follow a struct-based pattern with `Display` so that log text
//! lives in one place instead of being scattered as string literals.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - run lifecycle events
//! * `messages::node` - node invocation and skip events
//! * `messages::validation` - compile-time problems and results
//!
//! # Usage
//!
//! ```rust
//! use flowlet::errors::NodeError;
//! use flowlet::observability::messages::node::NodeExecutionFailed;
//!
//! let error = NodeError::new("division by zero");
//! let msg = NodeExecutionFailed {
//!     node: "divide",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingOptions};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Installing twice is
/// not an error; the first subscriber stays in place.
pub fn init_tracing(options: &LoggingOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match options.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
