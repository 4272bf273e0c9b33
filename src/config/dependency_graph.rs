use std::collections::{BTreeSet, HashMap};

/// Newtype wrapper for the node dependency graph: node -> nodes that depend on it.
///
/// Every node appears as a key, even when nothing depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph(pub HashMap<String, Vec<String>>);

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Ensure a node is present, with no dependents yet
    pub fn add_node(&mut self, node: &str) {
        self.0.entry(node.to_string()).or_default();
    }

    /// Record that `dependent` requires something produced by `dependency`.
    /// Repeated edges are stored once.
    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) {
        self.add_node(dependent);
        let dependents = self.0.entry(dependency.to_string()).or_default();
        if !dependents.iter().any(|d| d == dependent) {
            dependents.push(dependent.to_string());
        }
    }

    /// Get dependents for a node
    pub fn get_dependents(&self, node: &str) -> Option<&Vec<String>> {
        self.0.get(node)
    }

    /// Number of dependencies each node waits for.
    pub fn build_dependency_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = self.0.keys().map(|k| (k.clone(), 0)).collect();
        for dependents in self.0.values() {
            for dependent in dependents {
                *counts.entry(dependent.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Reverse view: node -> the nodes it depends on.
    pub fn build_reverse_dependencies(&self) -> HashMap<String, Vec<String>> {
        let mut reverse: HashMap<String, Vec<String>> =
            self.0.keys().map(|k| (k.clone(), Vec::new())).collect();
        for (dependency, dependents) in &self.0 {
            for dependent in dependents {
                reverse
                    .entry(dependent.clone())
                    .or_default()
                    .push(dependency.clone());
            }
        }
        reverse
    }

    /// Topological order via Kahn's algorithm.
    ///
    /// Among nodes that are ready at the same time, the one listed earlier in
    /// `priority` goes first; nodes missing from `priority` sort after those
    /// listed, by name. Returns `None` when the graph has a cycle.
    pub fn topological_order(&self, priority: &[String]) -> Option<Vec<String>> {
        let rank = |node: &str| -> (usize, String) {
            let index = priority
                .iter()
                .position(|p| p == node)
                .unwrap_or(priority.len());
            (index, node.to_string())
        };

        let mut counts = self.build_dependency_counts();
        let mut ready: BTreeSet<(usize, String)> = counts
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(node, _)| rank(node))
            .collect();

        let mut order = Vec::with_capacity(self.0.len());
        while let Some(next) = ready.pop_first() {
            let node = next.1;
            if let Some(dependents) = self.0.get(&node) {
                for dependent in dependents {
                    if let Some(count) = counts.get_mut(dependent) {
                        *count -= 1;
                        if *count == 0 {
                            ready.insert(rank(dependent));
                        }
                    }
                }
            }
            order.push(node);
        }

        if order.len() == self.0.len() {
            Some(order)
        } else {
            None
        }
    }
}
