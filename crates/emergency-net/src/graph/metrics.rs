//! Whole-network metrics over the active subgraph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::connectivity::Connectivity;
use super::model::{Graph, NodeKey};
use super::paths::{PathEngine, PathResult};

/// Snapshot of the headline numbers for a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub active_nodes: usize,
    pub active_edges: usize,
    pub density: f64,
    pub average_degree: f64,
    pub diameter: Option<f64>,
    pub connectivity_percent: f64,
    pub component_count: usize,
}

/// Network metric calculations
pub struct GraphMetrics;

impl GraphMetrics {
    /// Active edges over the edges a complete graph of the same size would have
    pub fn density<K: NodeKey>(graph: &Graph<K>) -> f64 {
        let n = graph.active_node_count();
        if n < 2 {
            return 0.0;
        }
        let possible = n * (n - 1) / 2;
        graph.active_edge_indices().count() as f64 / possible as f64
    }

    pub fn average_degree<K: NodeKey>(graph: &Graph<K>) -> f64 {
        let n = graph.active_node_count();
        if n == 0 {
            return 0.0;
        }
        2.0 * graph.active_edge_indices().count() as f64 / n as f64
    }

    /// Longest finite weighted shortest-path distance; `None` without active nodes
    pub fn diameter<K: NodeKey>(graph: &Graph<K>) -> Option<f64> {
        let engine = PathEngine::default();
        graph
            .active_node_indices()
            .flat_map(|source| {
                engine
                    .dijkstra(graph, source, None)
                    .dist
                    .into_iter()
                    .filter(|d| d.is_finite())
            })
            .max_by(f64::total_cmp)
    }

    /// Percentage of ordered active node pairs that can reach each other
    ///
    /// A network with a single active node counts as fully connected.
    pub fn connectivity_percent<K: NodeKey>(graph: &Graph<K>) -> f64 {
        let n = graph.active_node_count();
        match n {
            0 => 0.0,
            1 => 100.0,
            _ => {
                let connected: usize = Connectivity::connected_components(graph)
                    .iter()
                    .map(|c| c.len() * (c.len() - 1))
                    .sum();
                connected as f64 / (n * (n - 1)) as f64 * 100.0
            }
        }
    }

    /// How many routes have each hop count
    pub fn path_length_distribution<K: NodeKey>(paths: &[PathResult<K>]) -> BTreeMap<usize, usize> {
        let mut distribution = BTreeMap::new();
        for path in paths {
            *distribution.entry(path.hop_count()).or_insert(0) += 1;
        }
        distribution
    }

    pub fn average_path_weight<K: NodeKey>(paths: &[PathResult<K>]) -> f64 {
        if paths.is_empty() {
            return 0.0;
        }
        paths.iter().map(|p| p.total_weight).sum::<f64>() / paths.len() as f64
    }

    pub fn summary<K: NodeKey>(graph: &Graph<K>) -> NetworkSummary {
        NetworkSummary {
            active_nodes: graph.active_node_count(),
            active_edges: graph.active_edge_indices().count(),
            density: Self::density(graph),
            average_degree: Self::average_degree(graph),
            diameter: Self::diameter(graph),
            connectivity_percent: Self::connectivity_percent(graph),
            component_count: Connectivity::connected_components(graph).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> Graph<u32> {
        Graph::from_edges(
            0..4,
            [(0, 1, 4.0), (0, 2, 2.0), (1, 2, 1.0), (1, 3, 5.0), (2, 3, 8.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_density_and_degree() {
        let graph = create_test_graph();
        assert!((GraphMetrics::density(&graph) - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!(GraphMetrics::average_degree(&graph), 2.5);
    }

    #[test]
    fn test_diameter() {
        let graph = create_test_graph();
        // Farthest pair is 0-3 at distance 8
        assert_eq!(GraphMetrics::diameter(&graph), Some(8.0));
        assert_eq!(GraphMetrics::diameter(&Graph::<u32>::new()), None);
    }

    #[test]
    fn test_connectivity_percent() {
        let mut graph = create_test_graph();
        assert_eq!(GraphMetrics::connectivity_percent(&graph), 100.0);

        graph.set_active(&1, false).unwrap();
        graph.set_edge_active(&2, &3, false).unwrap();
        // {0, 2} and {3}: 2 of 6 ordered pairs
        let percent = GraphMetrics::connectivity_percent(&graph);
        assert!((percent - 100.0 / 3.0).abs() < 1e-9);

        let summary = GraphMetrics::summary(&graph);
        assert_eq!(summary.component_count, 2);
        assert_eq!(summary.active_nodes, 3);
        assert_eq!(summary.active_edges, 1);
    }

    #[test]
    fn test_path_distribution() {
        let graph = create_test_graph();
        let paths = PathEngine::default().all_simple_paths(&graph, &0, &3, 10);
        let distribution = GraphMetrics::path_length_distribution(&paths);
        assert_eq!(distribution.get(&2), Some(&2));
        assert_eq!(distribution.get(&3), Some(&2));
        assert!(GraphMetrics::average_path_weight(&paths) > 0.0);
    }
}
