// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made workflows used by the binary and the end-to-end tests.
//!
//! ## Branching workflow
//!
//! ```text
//! a ──> step1 ──┐            ┌──> step_a (route == "A") ──┐
//!               ├──> route ──┤                            ├──> merge
//! b ──> step2 ──┘            └──> step_b (route == "B") ──┘
//! ```
//!
//! `step1` and `step2` suspend for `step_delay` and run concurrently. `merge`
//! reads both branches optionally and returns whichever one ran.
//!
//! ## Processing template
//!
//! ```text
//! input_data ──> validate_input ──> process_data ──> route_decision
//!                       config ──┘        │    threshold ──┘    │ (gate read)
//!                                         ├──> handle_high <────┤
//!                                         └──> handle_low  <────┘
//!                                 handle_high / handle_low ──> merge_results
//! ```

use serde_json::Value;
use std::time::Duration;

use crate::backends::{async_fn, sync_fn};
use crate::errors::NodeError;
use crate::workflow::{optional, Gate, NodeDefinition, NodeOutput, ValueType, Workflow};

/// Two parameters, two slow entry steps, a router and two gated branches
/// merged through optional inputs.
pub fn branching_workflow(step_delay: Duration) -> Workflow {
    let mut wf = Workflow::new("branching");
    let a = wf.param("a", ValueType::Int, "first operand");
    let b = wf.param("b", ValueType::Int, "second operand");

    let step1 = wf.node(
        NodeDefinition::new(
            "step1",
            async_fn(move |inputs, log| async move {
                log.info("sleep 1");
                tokio::time::sleep(step_delay).await;
                Ok(NodeOutput::single(inputs.require("input1")?.clone()))
            }),
        )
        .describe("step 1")
        .input("input1", &a)
        .output("result", "echo of a"),
    );

    let step2 = wf.node(
        NodeDefinition::new(
            "step2",
            async_fn(move |inputs, log| async move {
                log.info("sleep 1");
                tokio::time::sleep(step_delay).await;
                Ok(NodeOutput::single(inputs.require("input1")?.clone()))
            }),
        )
        .describe("step 2")
        .input("input1", &b)
        .output("result", "echo of b"),
    );

    let route = wf.node(
        NodeDefinition::new(
            "route",
            sync_fn(|inputs, _| {
                let sum = inputs.i64("input1")? + inputs.i64("input2")?;
                Ok(NodeOutput::single(if sum >= 0 { "A" } else { "B" }))
            }),
        )
        .describe("branch decision")
        .input("input1", step1.output("result"))
        .input("input2", step2.output("result"))
        .output("route", "branch route"),
    );

    let step_a = wf.node(
        NodeDefinition::new(
            "step_a",
            sync_fn(|inputs, _| Ok(NodeOutput::single(inputs.i64("input1")? * 10))),
        )
        .describe("branch A")
        .input("route", route.output("route"))
        .input("input1", step1.output("result"))
        .output("result_a", "branch A result")
        .when(Gate::new(|ctx| ctx.get_str("route") == Some("A"))),
    );

    let step_b = wf.node(
        NodeDefinition::new(
            "step_b",
            sync_fn(|inputs, _| Ok(NodeOutput::single(inputs.i64("input2")? * -10))),
        )
        .describe("branch B")
        .input("route", route.output("route"))
        .input("input2", step2.output("result"))
        .output("result_b", "branch B result")
        .when(Gate::new(|ctx| ctx.get_str("route") == Some("B"))),
    );

    wf.node(
        NodeDefinition::new("merge", sync_fn(|inputs, _| Ok(NodeOutput::single(first_present(inputs, &["a", "b"])))))
            .describe("branch merge")
            .input("a", optional(step_a.output("result_a")))
            .input("b", optional(step_b.output("result_b")))
            .output("result", "merged result"),
    );

    wf
}

/// Validate, process, route on length against a threshold, then merge the
/// branch that ran.
///
/// The branch nodes take only the processed data as input; their gates read the
/// routing decision directly.
pub fn template_workflow() -> Workflow {
    let mut wf = Workflow::new("template");
    let input_data = wf.param("input_data", ValueType::Str, "input data");
    let config = wf.param("config", ValueType::Object, "processing options");
    let threshold = wf.param("threshold", ValueType::Int, "routing threshold");

    let validate = wf.node(
        NodeDefinition::new(
            "validate_input",
            sync_fn(|inputs, log| {
                let data = inputs.str("data")?;
                log.info(format!("validating input data: {}", data));
                if data.is_empty() {
                    return Err(NodeError::new("input data must not be empty"));
                }
                Ok(NodeOutput::single(data))
            }),
        )
        .describe("validate input data")
        .input("data", &input_data)
        .output("validated", "validated data"),
    );

    let process = wf.node(
        NodeDefinition::new(
            "process_data",
            async_fn(|inputs, log| async move {
                let data = inputs.str("data")?.to_string();
                log.info(format!(
                    "processing data: {}, config: {}",
                    data,
                    inputs.get("config").cloned().unwrap_or(Value::Null)
                ));
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(NodeOutput::single(format!("{}_processed", data)))
            }),
        )
        .describe("process data")
        .input("data", validate.output("validated"))
        .input("config", &config)
        .output("processed", "processed data"),
    );

    let decision = wf.node(
        NodeDefinition::new(
            "route_decision",
            sync_fn(|inputs, log| {
                let value = inputs.str("data")?.chars().count() as i64;
                let threshold = inputs.i64("threshold")?;
                log.info(format!("route decision: value={}, threshold={}", value, threshold));
                Ok(NodeOutput::single(if value > threshold { "high" } else { "low" }))
            }),
        )
        .describe("routing decision")
        .input("data", process.output("processed"))
        .input("threshold", &threshold)
        .output("route", "route"),
    );

    let high = wf.node(
        NodeDefinition::new(
            "handle_high",
            sync_fn(|inputs, log| {
                let data = inputs.str("data")?;
                log.info(format!("high branch: {}", data));
                Ok(NodeOutput::single(format!("{}_high", data)))
            }),
        )
        .describe("high value branch")
        .input("data", process.output("processed"))
        .output("high_result", "high branch result")
        .when(
            Gate::new(|ctx| ctx.get_str("route") == Some("high"))
                .reading(decision.output("route")),
        ),
    );

    let low = wf.node(
        NodeDefinition::new(
            "handle_low",
            sync_fn(|inputs, log| {
                let data = inputs.str("data")?;
                log.info(format!("low branch: {}", data));
                Ok(NodeOutput::single(format!("{}_low", data)))
            }),
        )
        .describe("low value branch")
        .input("data", process.output("processed"))
        .output("low_result", "low branch result")
        .when(
            Gate::new(|ctx| ctx.get_str("route") == Some("low"))
                .reading(decision.output("route")),
        ),
    );

    wf.node(
        NodeDefinition::new(
            "merge_results",
            sync_fn(|inputs, log| {
                let result = first_present(inputs, &["high", "low"]);
                log.info(format!("merged result: {}", result));
                Ok(NodeOutput::single(result))
            }),
        )
        .describe("merge branch results")
        .input("high", optional(high.output("high_result")))
        .input("low", optional(low.output("low_result")))
        .output("result", "final result"),
    );

    wf
}

/// First input among `names` that is present, or null.
fn first_present(inputs: &crate::workflow::NodeInputs, names: &[&str]) -> Value {
    names
        .iter()
        .find_map(|name| inputs.get(name).cloned())
        .unwrap_or(Value::Null)
}
