mod compiler;
mod graph;
mod logger;
mod reactive;
mod run_context;

pub use compiler::{compile, compile_graph_description};
pub use graph::{CompiledGraph, EdgeDescription, GraphDescription, InputDescription, NodeDescription};
pub use logger::{LogEntry, LogLevel, NodeLogger};
pub use reactive::ReactiveExecutor;
pub use run_context::{NodeResult, RunContext, RunStatus, SkipReason};
