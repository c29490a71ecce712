//! DAG building and deterministic topological sorting

use crate::error::{CoreError, CoreResult};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A directed acyclic graph of named nodes (migration steps or views)
#[derive(Debug, Default)]
pub struct StepDag {
    /// The underlying graph
    graph: DiGraph<String, ()>,

    /// Map from node name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl StepDag {
    /// Create a new empty DAG
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node to the DAG, returning its index
    ///
    /// Node indices increase with insertion, which is what makes the
    /// topological order stable across identical inputs.
    pub fn add_node(&mut self, name: &str) -> CoreResult<NodeIndex> {
        if let Some(&idx) = self.node_map.get(name) {
            Ok(idx)
        } else {
            if name.is_empty() {
                return Err(CoreError::EmptyName {
                    context: "node name in DAG".into(),
                });
            }
            let idx = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), idx);
            Ok(idx)
        }
    }

    /// Add a dependency edge: `dependent` requires `dependency`
    ///
    /// The edge goes from dependency to dependent, so topological sort
    /// yields dependencies first.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> CoreResult<()> {
        let dep_idx = self.add_node(dependency)?;
        let node_idx = self.add_node(dependent)?;
        self.graph.add_edge(dep_idx, node_idx, ());
        Ok(())
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        self.topological_order().map(|_| ())
    }

    /// Get node names in topological order (dependencies first)
    ///
    /// Kahn's algorithm, always draining the lowest node index among the
    /// ready set so that ties break by insertion order. `petgraph::algo::
    /// toposort` makes no ordering guarantee between independent nodes,
    /// and callers rely on resolve order being reproducible across runs.
    pub fn topological_order(&self) -> CoreResult<Vec<String>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .edges_directed(idx, petgraph::Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BTreeSet<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(&idx) = ready.iter().next() {
            ready.remove(&idx);
            order.push(self.graph[idx].clone());
            for edge in self
                .graph
                .edges_directed(idx, petgraph::Direction::Outgoing)
            {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.insert(target);
                }
            }
        }

        if order.len() != self.graph.node_count() {
            // Some node never reached in-degree zero, so a cycle exists.
            let start = self
                .graph
                .node_indices()
                .find(|idx| in_degree[idx.index()] > 0)
                .ok_or_else(|| CoreError::CircularDependency {
                    cycle: "<unknown>".into(),
                })?;
            return Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(start),
            });
        }

        Ok(order)
    }

    /// Get node names in reverse topological order (dependents first)
    pub fn reverse_topological_order(&self) -> CoreResult<Vec<String>> {
        let mut order = self.topological_order()?;
        order.reverse();
        Ok(order)
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Get direct dependencies of a node
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        if let Some(&idx) = self.node_map.get(name) {
            self.graph
                .edges_directed(idx, petgraph::Direction::Incoming)
                .map(|e| self.graph[e.source()].to_string())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get direct dependents of a node
    pub fn dependents(&self, name: &str) -> Vec<String> {
        if let Some(&idx) = self.node_map.get(name) {
            self.graph
                .edges_directed(idx, petgraph::Direction::Outgoing)
                .map(|e| self.graph[e.target()].to_string())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get all ancestors (transitive dependencies) of a node
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        if let Some(&idx) = self.node_map.get(name) {
            self.collect_reachable(idx, petgraph::Direction::Incoming)
        } else {
            Vec::new()
        }
    }

    /// Get all descendants (transitive dependents) of a node
    pub fn descendants(&self, name: &str) -> Vec<String> {
        if let Some(&idx) = self.node_map.get(name) {
            self.collect_reachable(idx, petgraph::Direction::Outgoing)
        } else {
            Vec::new()
        }
    }

    /// Collect every node transitively reachable from `start` by walking
    /// edges in `direction`, excluding `start` itself.
    fn collect_reachable(&self, start: NodeIndex, direction: petgraph::Direction) -> Vec<String> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut stack = vec![start];

        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, direction) {
                let neighbor = match direction {
                    petgraph::Direction::Incoming => edge.source(),
                    petgraph::Direction::Outgoing => edge.target(),
                };
                if visited.insert(neighbor) {
                    result.push(self.graph[neighbor].to_string());
                    stack.push(neighbor);
                }
            }
        }

        result
    }

    /// Get every node connected to `name` through edges in either
    /// direction, including `name` itself.
    ///
    /// A view cannot be dropped while another view still reads from it, so
    /// a rebuild has to cover the whole connected component, not just one
    /// side of the edge.
    pub fn component(&self, name: &str) -> Vec<String> {
        let Some(&start) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut result = vec![self.graph[start].to_string()];
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut stack = vec![start];

        while let Some(idx) = stack.pop() {
            for direction in [petgraph::Direction::Incoming, petgraph::Direction::Outgoing] {
                for edge in self.graph.edges_directed(idx, direction) {
                    let neighbor = match direction {
                        petgraph::Direction::Incoming => edge.source(),
                        petgraph::Direction::Outgoing => edge.target(),
                    };
                    if visited.insert(neighbor) {
                        result.push(self.graph[neighbor].to_string());
                        stack.push(neighbor);
                    }
                }
            }
        }

        result
    }

    /// Get all node names in the DAG
    pub fn nodes(&self) -> Vec<String> {
        self.node_map.keys().cloned().collect()
    }

    /// Check if a node exists in the DAG
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Number of nodes in the DAG
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True if the DAG holds no nodes
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
