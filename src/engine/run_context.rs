// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::engine::graph::CompiledGraph;
use crate::engine::logger::LogEntry;

/// Why a node did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A mandatory input's producer was itself skipped
    UpstreamSkipped { node: String },
    /// The node's gate evaluated to false
    ConditionNotSatisfied,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpstreamSkipped { node } => {
                write!(f, "upstream dependency skipped: {}", node)
            }
            SkipReason::ConditionNotSatisfied => f.write_str("condition not satisfied"),
        }
    }
}

/// Per-node outcome within one run.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeResult {
    Completed(BTreeMap<String, Value>),
    Skipped(SkipReason),
}

impl NodeResult {
    pub fn is_skipped(&self) -> bool {
        matches!(self, NodeResult::Skipped(_))
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        match self {
            NodeResult::Completed(outputs) => outputs.get(name),
            NodeResult::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Record of one run: identifiers, timings, logs, skips and terminal outputs.
///
/// Populated only by the executor that owns the run and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
    trace_id: Uuid,
    run_id: Uuid,
    workflow: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(serialize_with = "durations_as_secs")]
    timings: BTreeMap<String, Duration>,
    logs: Vec<LogEntry>,
    skipped: BTreeMap<String, String>,
    outputs: BTreeMap<String, BTreeMap<String, Value>>,
    status: RunStatus,
}

impl RunContext {
    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Wall time of the whole run.
    pub fn elapsed(&self) -> Duration {
        (self.end_time - self.start_time)
            .to_std()
            .unwrap_or_default()
    }

    /// Elapsed wall time per invoked node. Skipped nodes have no entry.
    pub fn timings(&self) -> &BTreeMap<String, Duration> {
        &self.timings
    }

    pub fn timing(&self, node: &str) -> Option<Duration> {
        self.timings.get(node).copied()
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Skipped nodes mapped to their reason.
    pub fn skipped(&self) -> &BTreeMap<String, String> {
        &self.skipped
    }

    pub fn was_skipped(&self, node: &str) -> bool {
        self.skipped.contains_key(node)
    }

    /// Outputs of every terminal node that produced a result.
    pub fn outputs(&self) -> &BTreeMap<String, BTreeMap<String, Value>> {
        &self.outputs
    }

    pub fn output(&self, node: &str, name: &str) -> Option<&Value> {
        self.outputs.get(node)?.get(name)
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }
}

fn durations_as_secs<S: Serializer>(
    timings: &BTreeMap<String, Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let secs: BTreeMap<&String, f64> = timings.iter().map(|(k, v)| (k, v.as_secs_f64())).collect();
    secs.serialize(serializer)
}

/// Mutable run bookkeeping shared by the node tasks of one run.
#[derive(Debug)]
pub(crate) struct RunRecorder {
    trace_id: Uuid,
    run_id: Uuid,
    start_time: DateTime<Utc>,
    pub(crate) timings: HashMap<String, Duration>,
    pub(crate) results: HashMap<String, Arc<NodeResult>>,
}

impl RunRecorder {
    pub(crate) fn start() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            run_id: Uuid::new_v4(),
            start_time: Utc::now(),
            timings: HashMap::new(),
            results: HashMap::new(),
        }
    }

    pub(crate) fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub(crate) fn record(&mut self, node: &str, result: Arc<NodeResult>) {
        self.results.insert(node.to_string(), result);
    }

    pub(crate) fn record_timing(&mut self, node: &str, elapsed: Duration) {
        self.timings.insert(node.to_string(), elapsed);
    }

    pub(crate) fn executed_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_skipped()).count()
    }

    pub(crate) fn skipped_count(&self) -> usize {
        self.results.values().filter(|r| r.is_skipped()).count()
    }

    pub(crate) fn result(&self, node: &str) -> Option<&NodeResult> {
        self.results.get(node).map(Arc::as_ref)
    }

    /// Snapshot the run into a read-only context.
    pub(crate) fn finish(&self, graph: &CompiledGraph, logs: Vec<LogEntry>, status: RunStatus) -> RunContext {
        let skipped = self
            .results
            .iter()
            .filter_map(|(node, result)| match result.as_ref() {
                NodeResult::Skipped(reason) => Some((node.clone(), reason.to_string())),
                NodeResult::Completed(_) => None,
            })
            .collect();

        let outputs = graph
            .terminals()
            .iter()
            .filter_map(|node| match self.results.get(node).map(Arc::as_ref) {
                Some(NodeResult::Completed(values)) => Some((node.clone(), values.clone())),
                _ => None,
            })
            .collect();

        RunContext {
            trace_id: self.trace_id,
            run_id: self.run_id,
            workflow: graph.workflow().to_string(),
            start_time: self.start_time,
            end_time: Utc::now(),
            timings: self.timings.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            logs,
            skipped,
            outputs,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(
            SkipReason::UpstreamSkipped {
                node: "step_a".into()
            }
            .to_string(),
            "upstream dependency skipped: step_a"
        );
        assert_eq!(
            SkipReason::ConditionNotSatisfied.to_string(),
            "condition not satisfied"
        );
    }

    #[test]
    fn test_node_result_output_lookup() {
        let completed = NodeResult::Completed(BTreeMap::from([(
            "result".to_string(),
            Value::from(30),
        )]));
        assert_eq!(completed.output("result"), Some(&Value::from(30)));
        assert!(!completed.is_skipped());

        let skipped = NodeResult::Skipped(SkipReason::ConditionNotSatisfied);
        assert_eq!(skipped.output("result"), None);
        assert!(skipped.is_skipped());
    }

    #[test]
    fn test_fresh_recorders_get_fresh_identifiers() {
        let first = RunRecorder::start();
        let second = RunRecorder::start();
        assert_ne!(first.run_id, second.run_id);
        assert_ne!(first.trace_id, second.trace_id);
    }
}
