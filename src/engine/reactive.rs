// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::consts::DEFAULT_MAX_CONCURRENCY;
use crate::config::{Config, ParameterValues};
use crate::engine::graph::CompiledGraph;
use crate::engine::logger::{LogSink, NodeLogger};
use crate::engine::run_context::{NodeResult, RunRecorder, RunStatus, SkipReason};
use crate::errors::{ExecutionError, NodeError, RunFailure};
use crate::observability::messages::engine::{
    ExecutionCompleted, ExecutionFailed, ExecutionStarted, NodeCancelled,
};
use crate::observability::messages::node::{
    NodeExecutionCompleted, NodeExecutionFailed, NodeExecutionStarted, NodeSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{NodeCallable, RunOutput, WorkflowExecutor};
use crate::workflow::{GateContext, NodeDefinition, NodeInputs, NodeOutput, Reference, ValueType};

/// Reactive/event-driven executor.
///
/// Every node of the compiled graph gets its own task and an inbox of dependency
/// events. When a node finishes, or is skipped, it notifies its dependents; a
/// node starts once every upstream node has reported. Independent branches
/// therefore run concurrently without any level computation.
///
/// ## Skips
///
/// - A mandatory input whose producer was skipped skips the node
///   ("upstream dependency skipped: <producer>")
/// - An optional input whose producer was skipped is bound as absent
/// - A gate evaluating to false skips the node ("condition not satisfied")
///
/// Skips are reported to dependents exactly like completions, so cascades
/// resolve without waiting.
///
/// ## Failure
///
/// The first failure cancels the run. Nodes still waiting on dependencies or on
/// a concurrency permit stop; invocations already admitted run to completion and
/// their timings and logs are kept in the failed run's context.
pub struct ReactiveExecutor {
    /// Maximum number of concurrently invoked nodes
    max_concurrency: usize,
}

/// Event sent between node tasks
#[derive(Debug, Clone)]
enum NodeEvent {
    /// An upstream node completed or was skipped
    DependencyResolved {
        dependency: String,
        result: Arc<NodeResult>,
    },
}

/// Per-task state for one node in the reactive network
struct NodeTask {
    name: String,
    receiver: mpsc::UnboundedReceiver<NodeEvent>,
    pending_dependencies: usize,
    upstream_results: HashMap<String, Arc<NodeResult>>,
}

/// State shared by all node tasks of one run
struct SharedRun {
    graph: CompiledGraph,
    params: ParameterValues,
    senders: HashMap<String, mpsc::UnboundedSender<NodeEvent>>,
    recorder: Mutex<RunRecorder>,
    sink: LogSink,
    semaphore: Semaphore,
    cancellation_token: CancellationToken,
    run_id: Uuid,
}

impl ReactiveExecutor {
    /// Create a new Reactive executor with the specified concurrency limit
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.executor_options.max_concurrency())
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Execute `graph` once with the given parameter values.
    ///
    /// Returns the run context plus the final output, or a [`RunFailure`]
    /// carrying the first error and the partial context.
    pub async fn run(
        &self,
        graph: &CompiledGraph,
        params: ParameterValues,
    ) -> Result<RunOutput, RunFailure> {
        let recorder = RunRecorder::start();
        let run_id = recorder.run_id();
        let run_id_text = run_id.to_string();
        let started = ExecutionStarted {
            workflow: graph.workflow(),
            run_id: &run_id_text,
            node_count: graph.len(),
            max_concurrency: self.max_concurrency,
        };
        started.log();
        let span = started.span("reactive");

        let (senders, tasks) = Self::build_notification_network(graph);
        let shared = Arc::new(SharedRun {
            graph: graph.clone(),
            params,
            senders,
            recorder: Mutex::new(recorder),
            sink: LogSink::default(),
            semaphore: Semaphore::new(self.max_concurrency),
            cancellation_token: CancellationToken::new(),
            run_id,
        });

        if let Err(error) = validate_parameters(graph, &shared.params) {
            return Err(Self::fail(&shared, error).await);
        }

        Self::execute(shared, tasks).instrument(span).await
    }

    async fn execute(shared: Arc<SharedRun>, tasks: Vec<NodeTask>) -> Result<RunOutput, RunFailure> {
        let mut join_set = JoinSet::new();
        for task in tasks {
            let span = tracing::info_span!("node", node = %task.name, run_id = %shared.run_id);
            join_set.spawn(Self::run_node(shared.clone(), task).instrument(span));
        }

        // Node failures take priority over internal errors such as join failures
        let mut node_error = None;
        let mut other_errors = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    // dependents of this task are still waiting on it
                    shared.cancellation_token.cancel();
                    if e.node().is_none() {
                        other_errors.push(e);
                    } else if node_error.is_none() {
                        node_error = Some(e);
                    }
                }
                Err(join_error) => {
                    shared.cancellation_token.cancel();
                    other_errors.push(ExecutionError::Internal {
                        message: format!("Task join failed: {}", join_error),
                    });
                }
            }
        }

        if let Some(error) = node_error.or_else(|| other_errors.into_iter().next()) {
            return Err(Self::fail(&shared, error).await);
        }

        let recorder = shared.recorder.lock().await;
        let context = recorder.finish(&shared.graph, shared.sink.snapshot(), RunStatus::Succeeded);
        let output = select_final_output(&shared.graph, &recorder);

        ExecutionCompleted {
            workflow: shared.graph.workflow(),
            executed: recorder.executed_count(),
            skipped: recorder.skipped_count(),
            duration: context.elapsed(),
        }
        .log();

        Ok((context, output))
    }

    /// Freeze the partial context and wrap it with `error`.
    async fn fail(shared: &SharedRun, error: ExecutionError) -> RunFailure {
        shared.cancellation_token.cancel();
        let context = shared.recorder.lock().await.finish(
            &shared.graph,
            shared.sink.snapshot(),
            RunStatus::Failed,
        );
        ExecutionFailed {
            workflow: shared.graph.workflow(),
            error: &error,
        }
        .log();
        RunFailure { error, context }
    }

    /// One inbox per node, with its initial pending dependency count.
    fn build_notification_network(
        graph: &CompiledGraph,
    ) -> (HashMap<String, mpsc::UnboundedSender<NodeEvent>>, Vec<NodeTask>) {
        let mut senders = HashMap::new();
        let mut tasks = Vec::with_capacity(graph.len());

        for name in graph.topological_order() {
            let (sender, receiver) = mpsc::unbounded_channel();
            senders.insert(name.to_string(), sender);
            tasks.push(NodeTask {
                name: name.to_string(),
                receiver,
                pending_dependencies: graph.upstream(name).len(),
                upstream_results: HashMap::new(),
            });
        }

        (senders, tasks)
    }

    async fn run_node(shared: Arc<SharedRun>, mut task: NodeTask) -> Result<(), ExecutionError> {
        let token = &shared.cancellation_token;

        while task.pending_dependencies > 0 {
            tokio::select! {
                _ = token.cancelled() => {
                    NodeCancelled { node: &task.name }.log();
                    return Ok(());
                }
                event = task.receiver.recv() => {
                    match event {
                        Some(NodeEvent::DependencyResolved { dependency, result }) => {
                            task.upstream_results.insert(dependency, result);
                            task.pending_dependencies -= 1;
                        }
                        None => {
                            return Err(ExecutionError::Internal {
                                message: format!("Channel closed for node '{}'", task.name),
                            });
                        }
                    }
                }
            }
        }

        let definition = shared.graph.node(&task.name).ok_or_else(|| ExecutionError::Internal {
            message: format!("Node '{}' missing from compiled graph", task.name),
        })?;

        let inputs = match gather_inputs(definition, &shared.params, &task.upstream_results)? {
            Gathered::Ready(inputs) => inputs,
            Gathered::Skip(reason) => return Self::skip(&shared, &task.name, reason).await,
        };

        if let Some(gate) = &definition.gate {
            let ctx = gate_context(&inputs, gate.reads(), &shared.params, &task.upstream_results);
            match std::panic::catch_unwind(AssertUnwindSafe(|| gate.evaluate(&ctx))) {
                Ok(true) => {}
                Ok(false) => {
                    return Self::skip(&shared, &task.name, SkipReason::ConditionNotSatisfied).await;
                }
                Err(panic) => {
                    let error = ExecutionError::NodeFailed {
                        node: task.name.clone(),
                        error: NodeError::new(format!("gate {}", panic_message(panic.as_ref()))),
                    };
                    NodeExecutionFailed {
                        node: &task.name,
                        error: &error,
                    }
                    .log();
                    token.cancel();
                    return Err(error);
                }
            }
        }

        let _permit = tokio::select! {
            _ = token.cancelled() => {
                NodeCancelled { node: &task.name }.log();
                return Ok(());
            }
            permit = shared.semaphore.acquire() => {
                permit.map_err(|e| ExecutionError::Internal {
                    message: format!("Failed to acquire semaphore permit for node '{}': {}", task.name, e),
                })?
            }
        };
        if token.is_cancelled() {
            NodeCancelled { node: &task.name }.log();
            return Ok(());
        }

        NodeExecutionStarted {
            node: &task.name,
            input_count: inputs.len(),
        }
        .log();

        let logger = NodeLogger::new(task.name.as_str(), shared.run_id, shared.sink.clone());
        let started = Instant::now();
        let outcome = AssertUnwindSafe(definition.callable.call(inputs, logger))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();
        shared.recorder.lock().await.record_timing(&task.name, elapsed);

        let result = match outcome {
            Ok(Ok(output)) => normalize_output(definition, output),
            Ok(Err(error)) => Err(ExecutionError::NodeFailed {
                node: task.name.clone(),
                error,
            }),
            Err(panic) => Err(ExecutionError::NodeFailed {
                node: task.name.clone(),
                error: NodeError::new(panic_message(panic.as_ref())),
            }),
        };

        match result {
            Ok(outputs) => {
                NodeExecutionCompleted {
                    node: &task.name,
                    duration: elapsed,
                }
                .log();
                Self::resolve(&shared, &task.name, NodeResult::Completed(outputs)).await;
                Ok(())
            }
            Err(error) => {
                NodeExecutionFailed {
                    node: &task.name,
                    error: &error,
                }
                .log();
                token.cancel();
                Err(error)
            }
        }
    }

    async fn skip(shared: &SharedRun, node: &str, reason: SkipReason) -> Result<(), ExecutionError> {
        NodeSkipped {
            node,
            reason: &reason.to_string(),
        }
        .log();
        Self::resolve(shared, node, NodeResult::Skipped(reason)).await;
        Ok(())
    }

    /// Record the node's result, then notify every dependent.
    async fn resolve(shared: &SharedRun, node: &str, result: NodeResult) {
        let result = Arc::new(result);
        shared.recorder.lock().await.record(node, result.clone());

        for dependent in shared.graph.dependents(node) {
            if let Some(sender) = shared.senders.get(dependent) {
                let event = NodeEvent::DependencyResolved {
                    dependency: node.to_string(),
                    result: result.clone(),
                };
                if sender.send(event).is_err() {
                    // receiver already gone: the dependent stopped on cancellation
                    tracing::debug!(node, dependent = %dependent, "dependent no longer listening");
                }
            }
        }
    }
}

impl Default for ReactiveExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

#[async_trait]
impl WorkflowExecutor for ReactiveExecutor {
    async fn run(&self, graph: &CompiledGraph, params: ParameterValues) -> Result<RunOutput, RunFailure> {
        ReactiveExecutor::run(self, graph, params).await
    }
}

enum Gathered {
    Ready(NodeInputs),
    Skip(SkipReason),
}

/// Resolve a parameter value; JSON null counts as not supplied.
fn param_value(params: &ParameterValues, name: &str) -> Option<Value> {
    params.get(name).filter(|v| !v.is_null()).cloned()
}

fn gather_inputs(
    definition: &NodeDefinition,
    params: &ParameterValues,
    upstream: &HashMap<String, Arc<NodeResult>>,
) -> Result<Gathered, ExecutionError> {
    let mut inputs = NodeInputs::new();

    for (name, input) in &definition.inputs {
        let value = match &input.reference {
            Reference::Param(p) => match param_value(params, &p.name) {
                Some(value) => Some(value),
                None if input.optional => None,
                None => {
                    return Err(ExecutionError::MissingParameter {
                        parameter: p.name.clone(),
                    })
                }
            },
            Reference::Output(o) => match upstream.get(&o.node).map(Arc::as_ref) {
                Some(NodeResult::Completed(outputs)) => match outputs.get(&o.output) {
                    Some(value) => Some(value.clone()),
                    None => {
                        return Err(ExecutionError::Internal {
                            message: format!(
                                "Node '{}' completed without output '{}'",
                                o.node, o.output
                            ),
                        })
                    }
                },
                Some(NodeResult::Skipped(_)) if input.optional => None,
                Some(NodeResult::Skipped(_)) => {
                    return Ok(Gathered::Skip(SkipReason::UpstreamSkipped {
                        node: o.node.clone(),
                    }))
                }
                None => {
                    return Err(ExecutionError::Internal {
                        message: format!(
                            "Node '{}' started before upstream '{}' reported",
                            definition.name, o.node
                        ),
                    })
                }
            },
        };
        inputs.bind(name.as_str(), value);
    }

    Ok(Gathered::Ready(inputs))
}

/// Inputs by local name plus gate reads by parameter or output name; absent
/// values are left out.
fn gate_context(
    inputs: &NodeInputs,
    reads: &[Reference],
    params: &ParameterValues,
    upstream: &HashMap<String, Arc<NodeResult>>,
) -> GateContext {
    let mut ctx = GateContext::new();
    for (name, value) in inputs.iter() {
        if let Some(value) = value {
            ctx.insert(name, value.clone());
        }
    }
    for reference in reads {
        let value = match reference {
            Reference::Param(p) => param_value(params, &p.name),
            Reference::Output(o) => upstream
                .get(&o.node)
                .and_then(|r| r.output(&o.output))
                .cloned(),
        };
        if let Some(value) = value {
            ctx.insert(reference.value_name(), value);
        }
    }
    ctx
}

/// Check supplied values against the graph's parameter declarations before
/// any node is admitted.
fn validate_parameters(graph: &CompiledGraph, params: &ParameterValues) -> Result<(), ExecutionError> {
    let mandatory = graph.mandatory_parameters();
    for declaration in graph.parameters() {
        match param_value(params, &declaration.name) {
            Some(value) if !declaration.value_type.accepts(&value) => {
                return Err(ExecutionError::InvalidParameter {
                    parameter: declaration.name.clone(),
                    expected: declaration.value_type,
                    actual: ValueType::describe(&value).to_string(),
                });
            }
            Some(_) => {}
            None if mandatory.contains(declaration.name.as_str()) => {
                return Err(ExecutionError::MissingParameter {
                    parameter: declaration.name.clone(),
                });
            }
            None => {}
        }
    }
    Ok(())
}

/// Map a callable's result onto the node's declared outputs.
fn normalize_output(
    definition: &NodeDefinition,
    output: NodeOutput,
) -> Result<BTreeMap<String, Value>, ExecutionError> {
    let mismatch = |detail: String| ExecutionError::OutputMismatch {
        node: definition.name.clone(),
        detail,
    };

    match output {
        NodeOutput::Single(value) => match definition.outputs.as_slice() {
            [only] => Ok(BTreeMap::from([(only.name.clone(), value)])),
            declared => Err(mismatch(format!(
                "returned a single value but declares {} outputs",
                declared.len()
            ))),
        },
        NodeOutput::Named(values) => {
            let missing: Vec<&str> = definition
                .outputs
                .iter()
                .map(|o| o.name.as_str())
                .filter(|name| !values.contains_key(*name))
                .collect();
            let undeclared: Vec<&str> = values
                .keys()
                .map(String::as_str)
                .filter(|name| !definition.declares_output(name))
                .collect();

            if missing.is_empty() && undeclared.is_empty() {
                Ok(values)
            } else {
                Err(mismatch(format!(
                    "missing [{}], undeclared [{}]",
                    missing.join(", "),
                    undeclared.join(", ")
                )))
            }
        }
    }
}

/// Designated output if set; otherwise the last terminal, in topological
/// order, that produced a result.
fn select_final_output(graph: &CompiledGraph, recorder: &RunRecorder) -> Option<Value> {
    if let Some(designated) = graph.designated_output() {
        return recorder
            .result(&designated.node)?
            .output(&designated.output)
            .cloned();
    }

    graph.terminals().iter().rev().find_map(|terminal| {
        match (recorder.result(terminal)?, graph.node(terminal)) {
            (NodeResult::Completed(outputs), Some(definition)) => {
                Some(terminal_value(definition, outputs))
            }
            _ => None,
        }
    })
}

/// A single declared output yields its value; several yield an object.
fn terminal_value(definition: &NodeDefinition, outputs: &BTreeMap<String, Value>) -> Value {
    match definition.outputs.as_slice() {
        [only] => outputs.get(&only.name).cloned().unwrap_or(Value::Null),
        _ => Value::Object(
            outputs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("node panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("node panicked: {}", message)
    } else {
        "node panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{ConstantNode, CountingNode, FailingNode, SleepNode};
    use crate::backends::sync_fn;
    use crate::engine::compile;
    use crate::workflow::{optional, Gate, OutputRef, Workflow};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn chain(len: usize) -> Workflow {
        let mut wf = Workflow::new("chain");
        let x = wf.param("x", ValueType::Int, "");
        let mut previous: Reference = x.into();
        for i in 0..len {
            let name = format!("proc{}", i + 1);
            let handle = wf.node(
                NodeDefinition::new(
                    name.clone(),
                    sync_fn(|inputs, _| Ok(NodeOutput::single(inputs.i64("in")? + 1))),
                )
                .input("in", previous.clone())
                .output(format!("{}_out", name), ""),
            );
            previous = handle.output(&format!("{}_out", name)).into();
        }
        wf
    }

    #[tokio::test]
    async fn test_reactive_executor_creation() {
        let executor = ReactiveExecutor::new(4);
        assert_eq!(executor.max_concurrency, 4);
        assert_eq!(ReactiveExecutor::new(0).max_concurrency, 1);
    }

    #[tokio::test]
    async fn test_reactive_executor_default() {
        let executor = ReactiveExecutor::default();
        assert_eq!(executor.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = Config::from_yaml_str("executor_options:\n  max_concurrency: 3\n").unwrap();
        assert_eq!(ReactiveExecutor::from_config(&config).max_concurrency(), 3);
    }

    #[tokio::test]
    async fn test_linear_dependency_chain() {
        let graph = compile(&chain(3)).unwrap();
        let (ctx, output) = ReactiveExecutor::new(2)
            .run(&graph, ParameterValues::new().with("x", 1))
            .await
            .unwrap();

        assert_eq!(output, Some(json!(4)));
        assert_eq!(ctx.status(), RunStatus::Succeeded);
        assert_eq!(ctx.timings().len(), 3);
        assert!(ctx.skipped().is_empty());
        assert_eq!(ctx.output("proc3", "proc3_out"), Some(&json!(4)));
    }

    #[tokio::test]
    async fn test_run_through_trait_object() {
        let graph = compile(&chain(1)).unwrap();
        let executor: Box<dyn WorkflowExecutor> = Box::new(ReactiveExecutor::default());
        let (_, output) = executor
            .run(&graph, ParameterValues::new().with("x", 10))
            .await
            .unwrap();
        assert_eq!(output, Some(json!(11)));
    }

    #[tokio::test]
    async fn test_missing_parameter_fails_before_any_node() {
        let (counting, calls) = CountingNode::new();
        let mut wf = Workflow::new("missing");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(NodeDefinition::new("n", Arc::new(counting)).input("a", a).output("out", ""));
        let graph = compile(&wf).unwrap();

        let failure = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new())
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            ExecutionError::MissingParameter {
                parameter: "a".into()
            }
        );
        assert_eq!(failure.context.status(), RunStatus::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_parameter_type() {
        let graph = compile(&chain(1)).unwrap();
        let failure = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("x", "three"))
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            ExecutionError::InvalidParameter {
                parameter: "x".into(),
                expected: ValueType::Int,
                actual: "str".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_optional_parameter_binds_absent() {
        let mut wf = Workflow::new("opt");
        let label = wf.param("label", ValueType::Str, "");
        wf.node(
            NodeDefinition::new(
                "greet",
                sync_fn(|inputs, _| {
                    let label = inputs.get_as::<String>("label")?.unwrap_or_else(|| "anonymous".into());
                    Ok(NodeOutput::single(format!("hello {}", label)))
                }),
            )
            .input("label", optional(label))
            .output("greeting", ""),
        );
        let graph = compile(&wf).unwrap();

        let (_, output) = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new())
            .await
            .unwrap();
        assert_eq!(output, Some(json!("hello anonymous")));
    }

    #[tokio::test]
    async fn test_single_value_with_many_outputs_is_mismatch() {
        let mut wf = Workflow::new("mismatch");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(
            NodeDefinition::new("two", Arc::new(ConstantNode::new(json!(1))))
                .input("a", a)
                .output("first", "")
                .output("second", ""),
        );
        let graph = compile(&wf).unwrap();

        let failure = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", 1))
            .await
            .unwrap_err();
        assert!(matches!(failure.error, ExecutionError::OutputMismatch { ref node, .. } if node == "two"));
    }

    #[tokio::test]
    async fn test_named_outputs_must_match_declaration() {
        let mut wf = Workflow::new("named");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(
            NodeDefinition::new(
                "split",
                sync_fn(|_, _| Ok(NodeOutput::named([("low", 1), ("extra", 2)]))),
            )
            .input("a", a)
            .output("low", "")
            .output("high", ""),
        );
        let graph = compile(&wf).unwrap();

        let failure = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", 1))
            .await
            .unwrap_err();
        match failure.error {
            ExecutionError::OutputMismatch { detail, .. } => {
                assert_eq!(detail, "missing [high], undeclared [extra]");
            }
            other => panic!("Expected OutputMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multi_output_terminal_yields_object() {
        let mut wf = Workflow::new("named");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(
            NodeDefinition::new(
                "split",
                sync_fn(|inputs, _| {
                    let a = inputs.i64("a")?;
                    Ok(NodeOutput::named([("low", a - 1), ("high", a + 1)]))
                }),
            )
            .input("a", a)
            .output("low", "")
            .output("high", ""),
        );
        let graph = compile(&wf).unwrap();

        let (_, output) = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", 5))
            .await
            .unwrap();
        assert_eq!(output, Some(json!({"low": 4, "high": 6})));
    }

    #[tokio::test]
    async fn test_panicking_node_fails_run() {
        let mut wf = Workflow::new("panic");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(
            NodeDefinition::new("boom", sync_fn(|_, _| panic!("kaboom")))
                .input("a", a)
                .output("out", ""),
        );
        let graph = compile(&wf).unwrap();

        let failure = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", 1))
            .await
            .unwrap_err();
        match failure.error {
            ExecutionError::NodeFailed { node, error } => {
                assert_eq!(node, "boom");
                assert!(error.message.contains("kaboom"));
            }
            other => panic!("Expected NodeFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fail_fast_stops_waiting_dependents() {
        let (counting, calls) = CountingNode::new();
        let mut wf = Workflow::new("fail");
        let a = wf.param("a", ValueType::Int, "");
        let failing = wf.node(
            NodeDefinition::new("failing", Arc::new(FailingNode::new()))
                .input("a", a)
                .output("f_out", ""),
        );
        wf.node(
            NodeDefinition::new("after", Arc::new(counting))
                .input("x", failing.output("f_out"))
                .output("after_out", ""),
        );
        let graph = compile(&wf).unwrap();

        let failure = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", 1))
            .await
            .unwrap_err();
        assert_eq!(failure.error.node(), Some("failing"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(failure.context.timing("failing").is_some());
        assert!(failure.context.timing("after").is_none());
    }

    #[tokio::test]
    async fn test_concurrency_limit_of_one_serializes() {
        let mut wf = Workflow::new("serial");
        let a = wf.param("a", ValueType::Int, "");
        for name in ["s1", "s2", "s3"] {
            wf.node(
                NodeDefinition::new(name, Arc::new(SleepNode::new(Duration::from_millis(50))))
                    .input("a", a.clone())
                    .output(format!("{}_out", name), ""),
            );
        }
        let graph = compile(&wf).unwrap();

        let started = Instant::now();
        ReactiveExecutor::new(1)
            .run(&graph, ParameterValues::new().with("a", 1))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_designated_output_may_be_interior() {
        let mut wf = chain(2);
        wf.designate_output(OutputRef::new("proc1", "proc1_out"));
        let graph = compile(&wf).unwrap();

        let (_, output) = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("x", 0))
            .await
            .unwrap();
        assert_eq!(output, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_last_terminal_in_order_wins() {
        let mut wf = Workflow::new("two_terminals");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(
            NodeDefinition::new("first", Arc::new(ConstantNode::new(json!("first"))))
                .input("a", a.clone())
                .output("first_out", ""),
        );
        wf.node(
            NodeDefinition::new("second", Arc::new(ConstantNode::new(json!("second"))))
                .input("a", a)
                .output("second_out", ""),
        );
        let graph = compile(&wf).unwrap();

        let (ctx, output) = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", 1))
            .await
            .unwrap();
        assert_eq!(output, Some(json!("second")));
        assert_eq!(ctx.outputs().len(), 2);
    }

    #[tokio::test]
    async fn test_gate_false_skips_and_cascades() {
        let mut wf = Workflow::new("gated");
        let a = wf.param("a", ValueType::Int, "");
        let gated = wf.node(
            NodeDefinition::new("gated", Arc::new(ConstantNode::new(json!(1))))
                .input("a", a)
                .output("g_out", "")
                .when(Gate::new(|ctx| ctx.get_i64("a").is_some_and(|a| a > 0))),
        );
        wf.node(
            NodeDefinition::new("after", Arc::new(ConstantNode::new(json!(2))))
                .input("x", gated.output("g_out"))
                .output("after_out", ""),
        );
        let graph = compile(&wf).unwrap();

        let (ctx, output) = ReactiveExecutor::default()
            .run(&graph, ParameterValues::new().with("a", -1))
            .await
            .unwrap();
        assert_eq!(output, None);
        assert_eq!(ctx.skipped()["gated"], "condition not satisfied");
        assert_eq!(ctx.skipped()["after"], "upstream dependency skipped: gated");
        assert!(ctx.timings().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_gate_fails_run_naming_node() {
        let (counting, calls) = CountingNode::new();
        let mut wf = Workflow::new("gate_panic");
        let a = wf.param("a", ValueType::Int, "");
        let gated = wf.node(
            NodeDefinition::new("gated", Arc::new(ConstantNode::new(json!(1))))
                .input("a", a)
                .output("g_out", "")
                .when(Gate::new(|ctx| ctx.get_str("missing").unwrap() == "yes")),
        );
        wf.node(
            NodeDefinition::new("after", Arc::new(counting))
                .input("x", gated.output("g_out"))
                .output("after_out", ""),
        );
        let graph = compile(&wf).unwrap();

        let failure = tokio::time::timeout(
            Duration::from_secs(3),
            ReactiveExecutor::default().run(&graph, ParameterValues::new().with("a", 1)),
        )
        .await
        .expect("run should not hang")
        .unwrap_err();

        match failure.error {
            ExecutionError::NodeFailed { node, error } => {
                assert_eq!(node, "gated");
                assert!(error.message.contains("panicked"));
            }
            other => panic!("Expected NodeFailed, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!failure.context.was_skipped("gated"));
    }

    #[tokio::test]
    async fn test_internal_error_cancels_waiting_dependents() {
        use crate::config::DependencyGraph;
        use crate::workflow::ParameterDeclaration;

        // "reader" asks for an output "producer" never declares; only a graph
        // built without validation can get here
        let producer = NodeDefinition::new("producer", Arc::new(ConstantNode::new(json!(1))))
            .input("a", crate::workflow::ParamRef::new("a"))
            .output("out", "");
        let reader = NodeDefinition::new("reader", Arc::new(ConstantNode::new(json!(2))))
            .input("x", OutputRef::new("producer", "undeclared"))
            .output("reader_out", "");
        let (counting, calls) = CountingNode::new();
        let last = NodeDefinition::new("last", Arc::new(counting))
            .input("y", OutputRef::new("reader", "reader_out"))
            .output("last_out", "");

        let mut dependents = DependencyGraph::new();
        dependents.add_dependency("producer", "reader");
        dependents.add_dependency("reader", "last");
        let graph = CompiledGraph::new(
            "unvalidated".to_string(),
            vec![ParameterDeclaration {
                name: "a".into(),
                value_type: ValueType::Int,
                description: String::new(),
            }],
            vec![producer, reader, last],
            dependents,
            None,
        );

        let failure = tokio::time::timeout(
            Duration::from_secs(3),
            ReactiveExecutor::default().run(&graph, ParameterValues::new().with("a", 1)),
        )
        .await
        .expect("run should not hang")
        .unwrap_err();

        assert!(matches!(failure.error, ExecutionError::Internal { .. }));
        assert_eq!(failure.error.node(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
