// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dependency graph and its topological leveling.
//!
//! A `Graph` stores, for each node, the set of nodes it depends on. `add_edge(from, to)`
//! means "from depends on to" — the same forward-adjacency convention the scheduler's
//! sub-graph construction uses when it restricts edges to the needed set.

use std::collections::{HashMap, HashSet};

/// Adjacency store over task names: node -> set of nodes it depends on.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashSet<String>,
    deps: HashMap<String, HashSet<String>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insertion of a node with no recorded dependencies (if new).
    pub fn add_node(&mut self, name: &str) {
        if self.nodes.insert(name.to_string()) {
            self.deps.entry(name.to_string()).or_default();
        }
    }

    /// Records that `from` depends on `to`. Both endpoints are added transparently
    /// if not already nodes. Idempotent.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.add_node(from);
        self.add_node(to);
        self.deps.get_mut(from).unwrap().insert(to.to_string());
    }

    /// Nodes with no outgoing edges — i.e. no dependencies.
    pub fn entry_nodes(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| self.deps.get(*n).map(|d| d.is_empty()).unwrap_or(true))
            .cloned()
            .collect()
    }

    /// Returns a non-empty set of node names involved in any cycle, or an empty
    /// set if the graph is acyclic. Uses Kahn's algorithm: nodes whose dependency
    /// count never reaches zero after a full sweep are part of (or blocked behind) a cycle.
    pub fn cycle_detection(&self) -> HashSet<String> {
        let mut remaining: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.deps.get(n).map(|d| d.len()).unwrap_or(0)))
            .collect();

        // reverse adjacency: node -> nodes that depend on it, so we can decrement
        // their remaining count once this node is resolved.
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for (node, deps) in &self.deps {
            for dep in deps {
                dependents.entry(dep.as_str()).or_default().push(node.as_str());
            }
        }

        let mut queue: Vec<&str> = remaining
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut resolved = 0usize;

        while let Some(node) = queue.pop() {
            resolved += 1;
            if let Some(deps) = dependents.get(node) {
                for dependent in deps {
                    let count = remaining.get_mut(dependent).unwrap();
                    *count -= 1;
                    if *count == 0 {
                        queue.push(dependent);
                    }
                }
            }
        }

        if resolved == self.nodes.len() {
            HashSet::new()
        } else {
            remaining
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(n, _)| n.to_string())
                .collect()
        }
    }

    /// Returns true iff adding `(from -> to)` would produce a cycle, checked on a
    /// cloned graph so the receiver is left untouched.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        let mut probe = self.clone();
        probe.add_edge(from, to);
        !probe.cycle_detection().is_empty()
    }

    /// Ordered list of levels: level 0 contains only entry nodes, level k contains
    /// nodes all of whose deps are in levels < k. Node-set membership per level is
    /// uniquely defined; within-level order is unspecified.
    pub fn execution_levels(&self) -> Result<Vec<Vec<String>>, GraphError> {
        if !self.cycle_detection().is_empty() {
            return Err(GraphError::Cyclic);
        }

        let mut placed: HashMap<String, usize> = HashMap::new();
        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut remaining: HashSet<&str> = self.nodes.iter().map(|n| n.as_str()).collect();

        while !remaining.is_empty() {
            let level: Vec<String> = remaining
                .iter()
                .filter(|n| {
                    self.deps
                        .get(**n)
                        .map(|deps| deps.iter().all(|d| placed.contains_key(d)))
                        .unwrap_or(true)
                })
                .map(|n| n.to_string())
                .collect();

            // Unreachable in practice: cycle_detection already ruled cycles out above,
            // so every remaining node must have all its deps already placed eventually.
            debug_assert!(!level.is_empty(), "leveling made no progress on an acyclic graph");

            let level_index = levels.len();
            for name in &level {
                placed.insert(name.clone(), level_index);
                remaining.remove(name.as_str());
            }
            levels.push(level);
        }

        Ok(levels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("dependency graph contains a cycle")]
    Cyclic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_nodes_have_no_deps() {
        let mut g = Graph::new();
        g.add_edge("child", "base");
        let entries = g.entry_nodes();
        assert_eq!(entries, vec!["base".to_string()]);
    }

    #[test]
    fn linear_chain_levels_in_order() {
        let mut g = Graph::new();
        g.add_edge("child", "base");
        let levels = g.execution_levels().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], vec!["base".to_string()]);
        assert_eq!(levels[1], vec!["child".to_string()]);
    }

    #[test]
    fn diamond_levels_group_parallel_branches() {
        let mut g = Graph::new();
        g.add_edge("left", "source");
        g.add_edge("right", "source");
        g.add_edge("sink", "left");
        g.add_edge("sink", "right");

        let levels = g.execution_levels().unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0], vec!["source".to_string()]);

        let mut mid = levels[1].clone();
        mid.sort();
        assert_eq!(mid, vec!["left".to_string(), "right".to_string()]);
        assert_eq!(levels[2], vec!["sink".to_string()]);
    }

    #[test]
    fn cycle_is_detected() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let cycle = g.cycle_detection();
        assert!(cycle.contains("a"));
        assert!(cycle.contains("b"));
        assert!(matches!(g.execution_levels(), Err(GraphError::Cyclic)));
    }

    #[test]
    fn would_create_cycle_detects_without_mutating() {
        let mut g = Graph::new();
        g.add_edge("b", "a");
        assert!(g.would_create_cycle("a", "b"));
        assert!(g.cycle_detection().is_empty(), "probe must not mutate the receiver");
    }

    #[test]
    fn table_driven_level_membership() {
        struct TestCase {
            name: &'static str,
            edges: Vec<(&'static str, &'static str)>,
            expected_level_sizes: Vec<usize>,
        }

        let cases = vec![
            TestCase {
                name: "single node",
                edges: vec![],
                expected_level_sizes: vec![],
            },
            TestCase {
                name: "fan out",
                edges: vec![("b", "a"), ("c", "a")],
                expected_level_sizes: vec![1, 2],
            },
        ];

        for case in cases {
            let mut g = Graph::new();
            if case.edges.is_empty() && case.name == "single node" {
                g.add_node("solo");
            }
            for (from, to) in &case.edges {
                g.add_edge(from, to);
            }
            let levels = g.execution_levels().unwrap();
            let sizes: Vec<usize> = levels.iter().map(|l| l.len()).collect();
            let expected = if case.name == "single node" {
                vec![1]
            } else {
                case.expected_level_sizes.clone()
            };
            assert_eq!(sizes, expected, "case '{}' produced unexpected level sizes", case.name);
        }
    }
}
