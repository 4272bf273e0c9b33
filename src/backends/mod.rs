// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node callable backends.
//!
//! ## Local Backend
//! In-process Rust closures adapted to the `NodeCallable` trait:
//! - **sync_fn**: plain closures that never suspend
//! - **async_fn**: closures returning futures (timers, I/O)
//!
//! ## Stub Backend (Test-Only)
//! - **ConstantNode**: returns a fixed value
//! - **SleepNode**: suspends for a fixed duration, then echoes an input
//! - **FailingNode**: always returns an error
//! - **CountingNode**: counts invocations, to assert a callable never ran
//!
//! # Examples
//!
//! ```rust
//! use flowlet::backends::{async_fn, sync_fn};
//! use flowlet::workflow::NodeOutput;
//! use std::time::Duration;
//!
//! let add = sync_fn(|inputs, _log| {
//!     Ok(NodeOutput::single(inputs.i64("a")? + inputs.i64("b")?))
//! });
//!
//! let wait = async_fn(|inputs, log| async move {
//!     log.info("sleep 1");
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     Ok(NodeOutput::single(inputs.require("input1")?.clone()))
//! });
//! # let _ = (add, wait);
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;

pub use local::{async_fn, sync_fn, AsyncFn, SyncFn};
