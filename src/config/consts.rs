/// Environment variable holding the run's parameters as a JSON object
pub const WORKFLOW_PARAM_ENV: &str = "WORKFLOW_PARAM";
/// Default cap on concurrently invoked nodes
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;
/// Default `tracing` filter when neither config nor `RUST_LOG` set one
pub const DEFAULT_LOG_LEVEL: &str = "info";
