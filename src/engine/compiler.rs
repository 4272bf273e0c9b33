// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow compilation: reachability, validation and deterministic ordering.

use std::collections::HashSet;

use crate::config::{validate_workflow, DependencyGraph};
use crate::engine::graph::{CompiledGraph, GraphDescription};
use crate::errors::CompileError;
use crate::observability::messages::validation::{
    log_compile_error, GraphCompiled, UnreachableNodeDropped,
};
use crate::observability::messages::StructuredLog;
use crate::workflow::{NodeDefinition, Reference, Workflow};

/// Compile a workflow into an immutable, shareable graph.
///
/// Only nodes reachable from the declared parameters are kept. Every problem is
/// logged; the first one is returned.
///
/// # Example
/// ```
/// use flowlet::backends::sync_fn;
/// use flowlet::engine::compile;
/// use flowlet::workflow::{NodeDefinition, NodeOutput, ValueType, Workflow};
///
/// let mut wf = Workflow::new("double");
/// let x = wf.param("x", ValueType::Int, "input");
/// wf.node(
///     NodeDefinition::new("double", sync_fn(|inputs, _| {
///         Ok(NodeOutput::single(inputs.i64("x")? * 2))
///     }))
///     .input("x", x)
///     .output("result", "doubled"),
/// );
///
/// let graph = compile(&wf).unwrap();
/// assert_eq!(graph.terminals(), ["double".to_string()]);
/// ```
pub fn compile(workflow: &Workflow) -> Result<CompiledGraph, CompileError> {
    let reachable = reachable_nodes(workflow);
    let dropped = workflow.nodes().len() - reachable.len();

    let mut errors = match validate_workflow(workflow, &reachable) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if let Some(designated) = workflow.designated_output() {
        let produced = reachable
            .iter()
            .any(|n| n.name == designated.node && n.declares_output(&designated.output));
        if !produced {
            errors.push(CompileError::UnresolvedReference {
                node: workflow.name().to_string(),
                reference: Reference::from(designated).to_string(),
            });
        }
    }

    if let Some(first) = errors.first().cloned() {
        errors.iter().for_each(log_compile_error);
        return Err(first);
    }

    let mut dependents = DependencyGraph::new();
    for node in &reachable {
        dependents.add_node(&node.name);
        for producer in node.upstream_nodes() {
            dependents.add_dependency(producer, &node.name);
        }
    }

    let registration: Vec<String> = reachable.iter().map(|n| n.name.clone()).collect();
    let order = dependents
        .topological_order(&registration)
        .ok_or_else(|| CompileError::Cycle {
            nodes: registration.clone(),
        })?;

    let ordered: Vec<NodeDefinition> = order
        .iter()
        .filter_map(|name| reachable.iter().find(|n| &n.name == name))
        .map(|n| (*n).clone())
        .collect();

    let graph = CompiledGraph::new(
        workflow.name().to_string(),
        workflow.parameters().to_vec(),
        ordered,
        dependents,
        workflow.designated_output().cloned(),
    );

    GraphCompiled {
        workflow: graph.workflow(),
        node_count: graph.len(),
        edge_count: graph.edges().len(),
        dropped,
    }
    .log();

    Ok(graph)
}

/// Compile and describe in one step, for export without a run.
pub fn compile_graph_description(workflow: &Workflow) -> Result<GraphDescription, CompileError> {
    compile(workflow).map(|graph| graph.describe())
}

/// Nodes transitively reachable from the parameters, in registration order.
///
/// A node is reachable once any of its references names a parameter or an
/// output of an already reachable node. Unreachable nodes are dropped.
fn reachable_nodes(workflow: &Workflow) -> Vec<&NodeDefinition> {
    let nodes = workflow.nodes();
    let mut marked = vec![false; nodes.len()];
    let mut names: HashSet<&str> = HashSet::new();

    loop {
        let mut changed = false;
        for (i, node) in nodes.iter().enumerate() {
            if marked[i] {
                continue;
            }
            let reached = node.references().any(|r| match r {
                Reference::Param(_) => true,
                Reference::Output(o) => names.contains(o.node.as_str()),
            });
            if reached {
                marked[i] = true;
                names.insert(node.name.as_str());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    nodes
        .iter()
        .zip(marked)
        .filter_map(|(node, reached)| {
            if !reached {
                UnreachableNodeDropped { node: &node.name }.log();
            }
            reached.then_some(node)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::ConstantNode;
    use crate::workflow::{optional, Gate, OutputRef, ValueType};
    use serde_json::json;
    use std::sync::Arc;

    fn constant() -> Arc<ConstantNode> {
        Arc::new(ConstantNode::new(json!(1)))
    }

    /// step1/step2 -> route -> step_a/step_b -> merge, registered in a
    /// scrambled order.
    fn branching() -> Workflow {
        let mut wf = Workflow::new("branching");
        let a = wf.param("a", ValueType::Int, "");
        let b = wf.param("b", ValueType::Int, "");
        wf.node(
            NodeDefinition::new("merge", constant())
                .input("x", optional(OutputRef::new("step_a", "result_a")))
                .input("y", optional(OutputRef::new("step_b", "result_b")))
                .output("result", ""),
        );
        wf.node(
            NodeDefinition::new("step2", constant())
                .input("b", &b)
                .output("s2", ""),
        );
        wf.node(
            NodeDefinition::new("step1", constant())
                .input("a", &a)
                .output("s1", ""),
        );
        wf.node(
            NodeDefinition::new("route", constant())
                .input("x", OutputRef::new("step1", "s1"))
                .input("y", OutputRef::new("step2", "s2"))
                .output("route", ""),
        );
        wf.node(
            NodeDefinition::new("step_a", constant())
                .input("r", OutputRef::new("route", "route"))
                .output("result_a", ""),
        );
        wf.node(
            NodeDefinition::new("step_b", constant())
                .input("r", OutputRef::new("route", "route"))
                .output("result_b", ""),
        );
        wf
    }

    #[test]
    fn test_compile_orders_topologically() {
        let graph = compile(&branching()).unwrap();
        let order: Vec<&str> = graph.topological_order().collect();
        assert_eq!(order, vec!["step2", "step1", "route", "step_a", "step_b", "merge"]);
        assert_eq!(graph.entry_points(), ["step2".to_string(), "step1".to_string()]);
        assert_eq!(graph.terminals(), ["merge".to_string()]);
        assert_eq!(graph.upstream("route"), ["step2".to_string(), "step1".to_string()]);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let wf = branching();
        let first = compile(&wf).unwrap();
        for _ in 0..10 {
            let again = compile(&wf).unwrap();
            assert!(first.topological_order().eq(again.topological_order()));
            assert_eq!(first.edges(), again.edges());
        }
    }

    #[test]
    fn test_edges_are_sorted_pairs() {
        let graph = compile(&branching()).unwrap();
        let edges = graph.edges();
        assert_eq!(edges.len(), 6);
        assert!(edges.windows(2).all(|w| w[0] <= w[1]));
        assert!(edges.contains(&("route".to_string(), "step_a".to_string())));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut wf = Workflow::new("cyclic");
        let p = wf.param("p", ValueType::Int, "");
        wf.node(
            NodeDefinition::new("a", constant())
                .input("p", &p)
                .input("from_b", OutputRef::new("b", "b_out"))
                .output("a_out", ""),
        );
        wf.node(
            NodeDefinition::new("b", constant())
                .input("from_a", OutputRef::new("a", "a_out"))
                .output("b_out", ""),
        );

        match compile(&wf) {
            Err(CompileError::Cycle { nodes }) => {
                assert!(nodes.contains(&"a".to_string()));
                assert!(nodes.contains(&"b".to_string()));
            }
            other => panic!("Expected Cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_output_is_rejected() {
        let mut wf = Workflow::new("dup");
        let p = wf.param("p", ValueType::Int, "");
        wf.node(NodeDefinition::new("a", constant()).input("p", &p).output("result", ""));
        wf.node(NodeDefinition::new("b", constant()).input("p", &p).output("result", ""));

        assert_eq!(
            compile(&wf).unwrap_err(),
            CompileError::DuplicateOutput {
                output: "result".into(),
                nodes: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn test_unresolved_param_is_rejected() {
        let mut wf = Workflow::new("typo");
        wf.param("a", ValueType::Int, "");
        wf.node(
            NodeDefinition::new("n", constant())
                .input("x", crate::workflow::ParamRef::new("missing"))
                .output("out", ""),
        );
        assert!(matches!(
            compile(&wf),
            Err(CompileError::UnresolvedReference { ref reference, .. }) if reference == "params.missing"
        ));
    }

    #[test]
    fn test_undeclared_output_is_rejected() {
        let mut wf = Workflow::new("typo");
        let a = wf.param("a", ValueType::Int, "");
        let first = wf.node(NodeDefinition::new("first", constant()).input("a", &a).output("out", ""));
        wf.node(
            NodeDefinition::new("second", constant())
                .input("x", first.output("not_declared"))
                .output("final", ""),
        );
        assert_eq!(
            compile(&wf).unwrap_err(),
            CompileError::UnresolvedReference {
                node: "second".into(),
                reference: "first.not_declared".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut wf = Workflow::new("dup");
        let a = wf.param("a", ValueType::Int, "");
        wf.node(NodeDefinition::new("n", constant()).input("a", &a).output("x", ""));
        wf.node(NodeDefinition::new("n", constant()).input("a", &a).output("y", ""));
        assert_eq!(
            compile(&wf).unwrap_err(),
            CompileError::DuplicateNode { node: "n".into() }
        );
    }

    #[test]
    fn test_unreachable_nodes_are_dropped() {
        let mut wf = branching();
        wf.node(NodeDefinition::new("orphan", constant()).output("orphan_out", ""));
        wf.node(
            NodeDefinition::new("orphan_child", constant())
                .input("x", OutputRef::new("orphan", "orphan_out"))
                .output("child_out", ""),
        );

        let graph = compile(&wf).unwrap();
        assert_eq!(graph.len(), 6);
        assert!(graph.node("orphan").is_none());
        assert!(graph.node("orphan_child").is_none());
    }

    #[test]
    fn test_reference_to_dropped_node_is_unresolved() {
        let mut wf = branching();
        wf.node(NodeDefinition::new("orphan", constant()).output("orphan_out", ""));
        let route = OutputRef::new("route", "route");
        wf.node(
            NodeDefinition::new("mixed", constant())
                .input("r", route)
                .input("o", OutputRef::new("orphan", "orphan_out"))
                .output("mixed_out", ""),
        );
        assert!(matches!(
            compile(&wf),
            Err(CompileError::UnresolvedReference { ref node, .. }) if node == "mixed"
        ));
    }

    #[test]
    fn test_gate_reads_add_edges() {
        let mut wf = branching();
        wf.node(
            NodeDefinition::new("gated", constant())
                .input("a", crate::workflow::ParamRef::new("a"))
                .output("gated_out", "")
                .when(Gate::new(|ctx| ctx.get_str("route") == Some("A")).reading(OutputRef::new("route", "route"))),
        );
        let graph = compile(&wf).unwrap();
        assert!(graph.upstream("gated").contains(&"route".to_string()));
        let order: Vec<&str> = graph.topological_order().collect();
        let route = order.iter().position(|n| *n == "route").unwrap();
        let gated = order.iter().position(|n| *n == "gated").unwrap();
        assert!(route < gated);
    }

    #[test]
    fn test_designated_output_must_exist() {
        let mut wf = branching();
        wf.designate_output(OutputRef::new("merge", "nope"));
        assert!(matches!(
            compile(&wf),
            Err(CompileError::UnresolvedReference { ref reference, .. }) if reference == "merge.nope"
        ));

        let mut wf = branching();
        wf.designate_output(OutputRef::new("route", "route"));
        let graph = compile(&wf).unwrap();
        assert_eq!(graph.designated_output(), Some(&OutputRef::new("route", "route")));
    }

    #[test]
    fn test_mandatory_parameters() {
        let mut wf = branching();
        let opt = wf.param("extra", ValueType::Str, "");
        wf.node(
            NodeDefinition::new("extra_user", constant())
                .input("e", optional(opt))
                .output("extra_out", ""),
        );
        let graph = compile(&wf).unwrap();
        let mandatory: Vec<&str> = graph.mandatory_parameters().into_iter().collect();
        assert_eq!(mandatory, vec!["a", "b"]);
    }

    #[test]
    fn test_description_exports_structure_only() {
        let description = compile_graph_description(&branching()).unwrap();
        assert_eq!(description.workflow, "branching");
        assert_eq!(description.parameters.len(), 2);
        assert_eq!(description.nodes.len(), 6);
        let merge = description.nodes.iter().find(|n| n.name == "merge").unwrap();
        assert!(merge.inputs.iter().all(|i| i.optional));
        assert!(!merge.has_gate);

        let json = serde_json::to_value(&description).unwrap();
        assert_eq!(json["terminals"], json!(["merge"]));
        assert_eq!(json["nodes"][0]["inputs"][0]["reference"]["kind"], json!("param"));

        let back: GraphDescription = serde_json::from_value(json).unwrap();
        assert_eq!(back, description);
    }
}
