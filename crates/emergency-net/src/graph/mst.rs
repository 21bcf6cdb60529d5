//! Minimum spanning tree construction (Kruskal)

use serde::{Deserialize, Serialize};

use super::model::{Graph, NodeKey, WeightedEdge};
use super::union_find::DisjointSet;
use crate::{NetworkError, Result};

/// Edges selected by Kruskal's algorithm over the active subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MstResult<K> {
    pub edges: Vec<WeightedEdge<K>>,
    pub total_weight: f64,
    /// `false` when the active subgraph is disconnected and `edges` is a forest
    pub is_spanning: bool,
    /// Number of trees in the result
    pub component_count: usize,
}

/// Builder for minimum spanning trees and forests
pub struct SpanningTreeBuilder;

impl SpanningTreeBuilder {
    /// Run Kruskal's algorithm over the active nodes and edges
    ///
    /// Edges of equal weight are taken in insertion order, so the output is
    /// reproducible.
    pub fn kruskal<K: NodeKey>(graph: &Graph<K>) -> Result<MstResult<K>> {
        let active_nodes: Vec<_> = graph.active_node_indices().collect();
        if active_nodes.is_empty() {
            return Err(NetworkError::EmptyGraph("minimum spanning tree"));
        }

        let mut sets = DisjointSet::new();
        for &node in &active_nodes {
            sets.make_set(node);
        }

        let mut candidates: Vec<_> = graph.active_edge_indices().collect();
        // Stable sort keeps insertion order between equal weights
        candidates.sort_by(|a, b| graph.edge(*a).weight.total_cmp(&graph.edge(*b).weight));

        let target = active_nodes.len() - 1;
        let mut accepted = Vec::with_capacity(target);
        let mut total_weight = 0.0;

        for index in candidates {
            if accepted.len() == target {
                break;
            }
            let edge = graph.edge(index);
            if sets.union(edge.from, edge.to) {
                tracing::trace!(
                    "MST accepts {}-{} ({})",
                    graph.key(edge.from),
                    graph.key(edge.to),
                    edge.weight
                );
                total_weight += edge.weight;
                accepted.push(graph.weighted_edge(index));
            }
        }

        let is_spanning = accepted.len() == target;
        let component_count = active_nodes.len() - accepted.len();
        if is_spanning {
            tracing::debug!(
                "MST spans {} nodes with {} edges, total weight {}",
                active_nodes.len(),
                accepted.len(),
                total_weight
            );
        } else {
            tracing::warn!(
                "Active graph is disconnected: spanning forest has {} trees",
                component_count
            );
        }

        Ok(MstResult {
            edges: accepted,
            total_weight,
            is_spanning,
            component_count,
        })
    }
}
