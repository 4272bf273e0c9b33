// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_LOG_LEVEL, DEFAULT_MAX_CONCURRENCY};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Engine configuration.
///
/// Workflows themselves are declared in code; this file only tunes how they
/// are executed and logged. Every section is optional.
///
/// # Fields
/// * `executor_options` - Executor-specific configuration options
/// * `logging` - Subscriber level and output format
///
/// # Example
/// ```yaml
/// executor_options:
///   max_concurrency: 4
/// logging:
///   level: debug
///   format: compact
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub logging: LoggingOptions,
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of concurrently invoked nodes (optional,
///   defaults to 64, values below 1 are raised to 1)
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

impl ExecutorOptions {
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
            .unwrap_or(DEFAULT_MAX_CONCURRENCY)
            .max(1)
    }
}

/// Subscriber configuration for the binary.
///
/// `level` is an `EnvFilter` directive such as `info` or `flowlet=debug`;
/// `RUST_LOG` overrides it when set.
#[derive(Debug, Deserialize, PartialEq)]
pub struct LoggingOptions {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Default, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Result<Config, ConfigError> = match extension.as_deref() {
        Some("yaml") | Some("yml") => Config::from_yaml_str,
        Some("toml") => Config::from_toml_str,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}
