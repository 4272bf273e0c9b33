// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of a workflow before it is compiled.
//!
//! The validation pipeline runs in a fixed order:
//!
//! 1. **Uniqueness**: parameter names and node names are unique
//! 2. **Output uniqueness**: no two nodes declare the same output name
//! 3. **Reference resolution**: every input and gate read points at a declared
//!    parameter or at an output some node in the graph produces
//! 4. **Cycle detection**: DFS with a recursion stack, reporting the cycle path
//!
//! Cycle detection only runs once references resolve, since it needs a
//! well-formed graph. Errors from the earlier stages are accumulated so callers
//! see every problem at once.
//!
//! # Example
//! ```rust
//! use flowlet::backends::sync_fn;
//! use flowlet::config::validate_workflow;
//! use flowlet::errors::CompileError;
//! use flowlet::workflow::{NodeDefinition, NodeOutput, ParamRef, ValueType, Workflow};
//!
//! let mut wf = Workflow::new("typo");
//! wf.param("a", ValueType::Int, "first");
//! wf.node(
//!     NodeDefinition::new("step", sync_fn(|_, _| Ok(NodeOutput::single(1))))
//!         .input("x", ParamRef::new("b"))
//!         .output("result", ""),
//! );
//!
//! let nodes: Vec<_> = wf.nodes().iter().collect();
//! let errors = validate_workflow(&wf, &nodes).unwrap_err();
//! assert!(matches!(errors[0], CompileError::UnresolvedReference { .. }));
//! ```

use std::collections::{HashMap, HashSet};

use crate::errors::CompileError;
use crate::workflow::{NodeDefinition, Reference, Workflow};

/// Validates the parameters of `workflow` and the given (reachable) nodes.
///
/// Name uniqueness covers every registered node; the remaining checks cover
/// only `nodes`.
///
/// # Returns
///
/// * `Ok(())` - the nodes form a valid, acyclic graph
/// * `Err(Vec<CompileError>)` - every problem found, in pipeline order
pub fn validate_workflow(
    workflow: &Workflow,
    nodes: &[&NodeDefinition],
) -> Result<(), Vec<CompileError>> {
    let mut errors = Vec::new();

    if let Err(duplicates) = validate_unique_names(workflow) {
        errors.extend(duplicates);
    }

    if let Err(duplicates) = validate_unique_outputs(nodes) {
        errors.extend(duplicates);
    }

    if let Err(unresolved) = validate_references(workflow, nodes) {
        errors.extend(unresolved);
    }

    if errors.is_empty() {
        if let Err(cycle) = validate_acyclic_graph(nodes) {
            errors.push(cycle);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parameter names and node names must each be unique. Node names are checked
/// across every registration, reachable or not.
fn validate_unique_names(workflow: &Workflow) -> Result<(), Vec<CompileError>> {
    let mut errors = Vec::new();

    let mut seen_params = HashSet::new();
    for param in workflow.parameters() {
        if !seen_params.insert(param.name.as_str()) {
            errors.push(CompileError::DuplicateParameter {
                parameter: param.name.clone(),
            });
        }
    }

    let mut seen_nodes = HashSet::new();
    for node in workflow.nodes() {
        if !seen_nodes.insert(node.name.as_str()) {
            errors.push(CompileError::DuplicateNode {
                node: node.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Output names are global within one graph; gates and final-output selection
/// look values up by output name.
fn validate_unique_outputs(nodes: &[&NodeDefinition]) -> Result<(), Vec<CompileError>> {
    let mut producers: Vec<(&str, Vec<String>)> = Vec::new();
    for node in nodes {
        for output in &node.outputs {
            match producers.iter_mut().find(|(name, _)| *name == output.name) {
                Some((_, owners)) => owners.push(node.name.clone()),
                None => producers.push((output.name.as_str(), vec![node.name.clone()])),
            }
        }
    }

    let errors: Vec<CompileError> = producers
        .into_iter()
        .filter(|(_, owners)| owners.len() > 1)
        .map(|(output, owners)| CompileError::DuplicateOutput {
            output: output.to_string(),
            nodes: owners,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every reference must point at a declared parameter or a produced output.
fn validate_references(
    workflow: &Workflow,
    nodes: &[&NodeDefinition],
) -> Result<(), Vec<CompileError>> {
    let by_name: HashMap<&str, &NodeDefinition> =
        nodes.iter().map(|n| (n.name.as_str(), *n)).collect();
    let mut errors = Vec::new();

    for node in nodes {
        for reference in node.references() {
            let resolved = match reference {
                Reference::Param(p) => workflow.parameter(&p.name).is_some(),
                Reference::Output(o) => by_name
                    .get(o.node.as_str())
                    .is_some_and(|producer| producer.declares_output(&o.output)),
            };
            if !resolved {
                errors.push(CompileError::UnresolvedReference {
                    node: node.name.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// DFS with a recursion stack ("three colors"): reaching a node that is still
/// on the stack means a back edge, and the stack segment from that node is the
/// cycle.
fn validate_acyclic_graph(nodes: &[&NodeDefinition]) -> Result<(), CompileError> {
    // dependency -> dependents, in declaration order for a stable report
    let mut graph: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes {
        graph.entry(node.name.as_str()).or_default();
    }
    for node in nodes {
        for dependency in node.upstream_nodes() {
            graph.entry(dependency).or_default().push(node.name.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for node in nodes {
        let name = node.name.as_str();
        if !visited.contains(name) {
            if let Some(cycle) =
                dfs_cycle_detection(name, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Err(CompileError::Cycle { nodes: cycle });
            }
        }
    }

    Ok(())
}

fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| *x == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::ConstantNode;
    use crate::workflow::{optional, OutputRef, ParamRef, ValueType};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_node(name: &str, inputs: Vec<(&str, &str)>, output: &str) -> NodeDefinition {
        let mut def = NodeDefinition::new(name, Arc::new(ConstantNode::new(json!(0))));
        for (i, (node, out)) in inputs.into_iter().enumerate() {
            let reference = if node == "params" {
                Reference::from(ParamRef::new(out))
            } else {
                Reference::from(OutputRef::new(node, out))
            };
            def = def.input(format!("in{}", i), reference);
        }
        def.output(output, "")
    }

    fn workflow_with(nodes: Vec<NodeDefinition>) -> Workflow {
        let mut wf = Workflow::new("test");
        wf.param("a", ValueType::Int, "");
        for node in nodes {
            wf.node(node);
        }
        wf
    }

    fn validate(wf: &Workflow) -> Result<(), Vec<CompileError>> {
        let nodes: Vec<&NodeDefinition> = wf.nodes().iter().collect();
        validate_workflow(wf, &nodes)
    }

    #[test]
    fn test_valid_empty_workflow() {
        assert!(validate(&workflow_with(vec![])).is_ok());
    }

    #[test]
    fn test_valid_linear_chain() {
        let wf = workflow_with(vec![
            create_test_node("a", vec![("params", "a")], "a_out"),
            create_test_node("b", vec![("a", "a_out")], "b_out"),
            create_test_node("c", vec![("b", "b_out")], "c_out"),
        ]);
        assert!(validate(&wf).is_ok());
    }

    #[test]
    fn test_valid_diamond_dependency() {
        let wf = workflow_with(vec![
            create_test_node("a", vec![("params", "a")], "a_out"),
            create_test_node("b", vec![("a", "a_out")], "b_out"),
            create_test_node("c", vec![("a", "a_out")], "c_out"),
            create_test_node("d", vec![("b", "b_out"), ("c", "c_out")], "d_out"),
        ]);
        assert!(validate(&wf).is_ok());
    }

    #[test]
    fn test_duplicate_output_names() {
        let wf = workflow_with(vec![
            create_test_node("a", vec![("params", "a")], "result"),
            create_test_node("b", vec![("params", "a")], "result"),
        ]);
        let errors = validate(&wf).unwrap_err();
        assert_eq!(
            errors,
            vec![CompileError::DuplicateOutput {
                output: "result".into(),
                nodes: vec!["a".into(), "b".into()],
            }]
        );
    }

    #[test]
    fn test_duplicate_node_and_parameter_names() {
        let mut wf = workflow_with(vec![
            create_test_node("a", vec![("params", "a")], "x"),
            create_test_node("a", vec![("params", "a")], "y"),
        ]);
        wf.param("a", ValueType::Str, "again");
        let errors = validate(&wf).unwrap_err();
        assert!(errors.contains(&CompileError::DuplicateParameter { parameter: "a".into() }));
        assert!(errors.contains(&CompileError::DuplicateNode { node: "a".into() }));
    }

    #[test]
    fn test_unresolved_parameter_and_output() {
        let wf = workflow_with(vec![
            create_test_node("a", vec![("params", "missing")], "a_out"),
            create_test_node("b", vec![("a", "nope")], "b_out"),
        ]);
        let errors = validate(&wf).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            CompileError::UnresolvedReference {
                node: "a".into(),
                reference: "params.missing".into(),
            }
        );
        assert_eq!(
            errors[1],
            CompileError::UnresolvedReference {
                node: "b".into(),
                reference: "a.nope".into(),
            }
        );
    }

    #[test]
    fn test_unresolved_gate_read() {
        use crate::workflow::Gate;
        let gated = create_test_node("b", vec![("params", "a")], "b_out")
            .when(Gate::new(|_| true).reading(OutputRef::new("router", "route")));
        let wf = workflow_with(vec![gated]);
        let errors = validate(&wf).unwrap_err();
        assert!(matches!(errors[0], CompileError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_simple_cycle() {
        let wf = workflow_with(vec![
            create_test_node("a", vec![("params", "a"), ("b", "b_out")], "a_out"),
            create_test_node("b", vec![("a", "a_out")], "b_out"),
        ]);
        let errors = validate(&wf).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            CompileError::Cycle {
                nodes: vec!["a".into(), "b".into(), "a".into()],
            }
        );
    }

    #[test]
    fn test_self_dependency_cycle() {
        let wf = workflow_with(vec![create_test_node("a", vec![("a", "a_out")], "a_out")]);
        let errors = validate(&wf).unwrap_err();
        assert!(matches!(errors[0], CompileError::Cycle { .. }));
    }

    #[test]
    fn test_optional_edges_still_count_for_cycles() {
        let a = create_test_node("a", vec![("params", "a")], "a_out")
            .input("late", optional(OutputRef::new("c", "c_out")));
        let wf = workflow_with(vec![
            a,
            create_test_node("b", vec![("a", "a_out")], "b_out"),
            create_test_node("c", vec![("b", "b_out")], "c_out"),
        ]);
        let errors = validate(&wf).unwrap_err();
        match &errors[0] {
            CompileError::Cycle { nodes } => assert_eq!(nodes.len(), 4),
            other => panic!("Expected Cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_check_skipped_when_references_are_broken() {
        let wf = workflow_with(vec![
            create_test_node("a", vec![("b", "b_out"), ("params", "missing")], "a_out"),
            create_test_node("b", vec![("a", "a_out")], "b_out"),
        ]);
        let errors = validate(&wf).unwrap_err();
        assert!(errors
            .iter()
            .all(|e| matches!(e, CompileError::UnresolvedReference { .. })));
    }
}
