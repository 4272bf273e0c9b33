// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Run-scoped logging handed to node callables.
//!
//! Each invocation receives a [`NodeLogger`] bound to its run. Entries are
//! appended to the run's ordered log and mirrored to `tracing`; nothing is
//! written to process-wide state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(level)
    }
}

/// One structured log line emitted by a node during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub node: String,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.timestamp.to_rfc3339(),
            self.node,
            self.level,
            self.message
        )
    }
}

/// Append-only, run-private log buffer.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogSink(Arc<Mutex<Vec<LogEntry>>>);

impl LogSink {
    fn push(&self, entry: LogEntry) {
        // A poisoned lock only means another node panicked mid-push; keep logging.
        let mut entries = self.0.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(entry);
    }

    pub(crate) fn snapshot(&self) -> Vec<LogEntry> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Logger bound to one node within one run.
#[derive(Debug, Clone)]
pub struct NodeLogger {
    node: String,
    run_id: Uuid,
    sink: LogSink,
}

impl NodeLogger {
    pub(crate) fn new(node: impl Into<String>, run_id: Uuid, sink: LogSink) -> Self {
        Self {
            node: node.into(),
            run_id,
            sink,
        }
    }

    /// A logger with its own private buffer, for exercising callables outside a run.
    pub fn detached(node: impl Into<String>) -> Self {
        Self::new(node, Uuid::nil(), LogSink::default())
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.record(LogLevel::Debug, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.record(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.record(LogLevel::Error, message.into());
    }

    /// Everything recorded in this logger's buffer so far, across all nodes
    /// sharing it.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.sink.snapshot()
    }

    fn record(&self, level: LogLevel, message: String) {
        let node = self.node.as_str();
        let run_id = self.run_id;
        match level {
            LogLevel::Debug => tracing::debug!(node, %run_id, "{}", message),
            LogLevel::Info => tracing::info!(node, %run_id, "{}", message),
            LogLevel::Warn => tracing::warn!(node, %run_id, "{}", message),
            LogLevel::Error => tracing::error!(node, %run_id, "{}", message),
        }
        self.sink.push(LogEntry {
            timestamp: Utc::now(),
            node: self.node.clone(),
            level,
            message,
        });
    }
}
