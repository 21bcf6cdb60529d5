//! Reachability over the active subgraph

use std::collections::VecDeque;

use super::model::{Graph, NodeIndex, NodeKey};
use crate::{NetworkError, Result};

/// Breadth-first connectivity queries
pub struct Connectivity;

impl Connectivity {
    /// Component id for every node; inactive nodes get `None`
    ///
    /// Ids are assigned in order of each component's earliest-inserted member.
    pub fn component_labels<K: NodeKey>(graph: &Graph<K>) -> Vec<Option<usize>> {
        let mut labels = vec![None; graph.node_count()];
        let mut next = 0;

        for start in graph.active_node_indices() {
            if labels[start].is_some() {
                continue;
            }
            labels[start] = Some(next);
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                for (neighbor, _) in graph.active_adjacent(node) {
                    if labels[neighbor].is_none() {
                        labels[neighbor] = Some(next);
                        queue.push_back(neighbor);
                    }
                }
            }
            next += 1;
        }

        labels
    }

    /// Connected components of the active subgraph as key lists
    pub fn connected_components<K: NodeKey>(graph: &Graph<K>) -> Vec<Vec<K>> {
        let labels = Self::component_labels(graph);
        let count = labels.iter().flatten().max().map_or(0, |m| m + 1);
        let mut components = vec![Vec::new(); count];
        for (index, label) in labels.iter().enumerate() {
            if let Some(label) = label {
                components[*label].push(graph.key(index).clone());
            }
        }
        components
    }

    /// Whether all active nodes form a single component
    pub fn is_connected<K: NodeKey>(graph: &Graph<K>) -> bool {
        Self::connected_components(graph).len() <= 1
    }

    /// Nodes reachable from `node`, itself included, in discovery order
    pub fn reachable_from<K: NodeKey>(graph: &Graph<K>, node: &K) -> Result<Vec<K>> {
        let start = graph
            .node_index(node)
            .ok_or_else(|| NetworkError::node_not_found(node))?;
        Ok(Self::reachable_indices(graph, start)
            .into_iter()
            .map(|i| graph.key(i).clone())
            .collect())
    }

    pub(crate) fn reachable_indices<K: NodeKey>(
        graph: &Graph<K>,
        start: NodeIndex,
    ) -> Vec<NodeIndex> {
        if !graph.is_active_at(start) {
            return Vec::new();
        }
        let mut seen = vec![false; graph.node_count()];
        let mut order = vec![start];
        let mut queue = VecDeque::from([start]);
        seen[start] = true;

        while let Some(node) = queue.pop_front() {
            for (neighbor, _) in graph.active_adjacent(node) {
                if !seen[neighbor] {
                    seen[neighbor] = true;
                    order.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        order
    }
}
