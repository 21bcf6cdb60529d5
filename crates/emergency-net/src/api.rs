//! Entry points for embedding applications
//!
//! Thin wrappers that run each analysis with default settings. Callers that
//! need a custom [`AnalysisConfig`](crate::AnalysisConfig) use the engines
//! directly, or share a graph through a [`NetworkHandle`](crate::NetworkHandle).

use crate::graph::coloring::{ColoringAnalysis, ColoringEngine, ColoringResult, ColoringViolation};
use crate::graph::disjoint::DisjointPathFinder;
use crate::graph::failure::{CascadeRound, FailureAnalyzer, FailureReport};
use crate::graph::model::{EdgeSpec, Graph, NodeKey};
use crate::graph::mst::{MstResult, SpanningTreeBuilder};
use crate::graph::paths::{PathEngine, PathResult};
use crate::Result;

pub use crate::tree::rebalance::rebalance_tree;

/// Build a graph, rejecting the first invalid edge
pub fn build_graph<K: NodeKey>(
    nodes: impl IntoIterator<Item = K>,
    edges: impl IntoIterator<Item = EdgeSpec<K>>,
) -> Result<Graph<K>> {
    let graph = Graph::build(nodes, edges)?;
    tracing::debug!(
        "Built graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

pub fn compute_mst<K: NodeKey>(graph: &Graph<K>) -> Result<MstResult<K>> {
    SpanningTreeBuilder::kruskal(graph)
}

pub fn shortest_path<K: NodeKey>(
    graph: &Graph<K>,
    source: &K,
    target: &K,
) -> Result<PathResult<K>> {
    PathEngine::default().shortest_path(graph, source, target)
}

pub fn k_disjoint_paths<K: NodeKey>(
    graph: &Graph<K>,
    source: &K,
    target: &K,
    k: usize,
) -> Result<Vec<PathResult<K>>> {
    DisjointPathFinder::default().k_disjoint_paths(graph, source, target, k)
}

/// The graph's flags are identical before and after the call
pub fn simulate_node_failure<K: NodeKey>(
    graph: &mut Graph<K>,
    node: &K,
) -> Result<FailureReport<K>> {
    FailureAnalyzer::default().simulate_node_failure(graph, node)
}

pub fn simulate_cascade<K: NodeKey>(
    graph: &mut Graph<K>,
    initial_failures: &[K],
) -> Result<Vec<CascadeRound<K>>> {
    FailureAnalyzer::default().simulate_cascade(graph, initial_failures)
}

pub fn color_graph<K: NodeKey>(graph: &Graph<K>) -> ColoringResult<K> {
    ColoringEngine::welsh_powell(graph)
}

pub fn validate_coloring<K: NodeKey>(graph: &Graph<K>, coloring: &ColoringResult<K>) -> bool {
    ColoringEngine::is_valid(graph, coloring)
}

pub fn coloring_violations<K: NodeKey>(
    graph: &Graph<K>,
    coloring: &ColoringResult<K>,
) -> Vec<ColoringViolation<K>> {
    ColoringEngine::violations(graph, coloring)
}

pub fn analyze_coloring<K: NodeKey>(
    graph: &Graph<K>,
    coloring: &ColoringResult<K>,
) -> ColoringAnalysis {
    ColoringEngine::analyze(graph, coloring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::avl::AvlTree;
    use crate::tree::node::BinaryTree;

    fn network() -> Graph<u32> {
        build_graph(
            0..4,
            [
                EdgeSpec::new(0, 1, 4.0),
                EdgeSpec::new(0, 2, 2.0),
                EdgeSpec::new(1, 2, 1.0),
                EdgeSpec::new(1, 3, 5.0),
                EdgeSpec::new(2, 3, 8.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_mst_scenario() {
        let mst = compute_mst(&network()).unwrap();
        let chosen: Vec<_> = mst.edges.iter().map(|e| (e.from, e.to, e.weight)).collect();
        assert_eq!(chosen, vec![(1, 2, 1.0), (0, 2, 2.0), (1, 3, 5.0)]);
        assert_eq!(mst.total_weight, 8.0);
        assert!(mst.is_spanning);
    }

    #[test]
    fn test_shortest_path_scenario() {
        let path = shortest_path(&network(), &0, &3).unwrap();
        assert_eq!(path.nodes, vec![0, 2, 1, 3]);
        assert_eq!(path.total_weight, 8.0);
    }

    #[test]
    fn test_avl_scenario() {
        let mut tree = AvlTree::new();
        for key in [10, 20, 30] {
            tree.insert(key);
        }
        assert_eq!(tree.root().map(|n| n.key), Some(20));
        tree.insert(40);
        tree.insert(50);

        let root = tree.root().unwrap();
        assert_eq!(root.key, 20);
        assert_eq!(root.left.as_ref().map(|n| n.key), Some(10));
        let right = root.right.as_ref().unwrap();
        assert_eq!(right.key, 40);
        assert_eq!(right.left.as_ref().map(|n| n.key), Some(30));
        assert_eq!(right.right.as_ref().map(|n| n.key), Some(50));
    }

    #[test]
    fn test_coloring_scenario() {
        let graph = build_graph(
            ["A", "B", "C", "D"],
            [
                EdgeSpec::new("A", "B", 1.0),
                EdgeSpec::new("B", "C", 1.0),
                EdgeSpec::new("C", "D", 1.0),
                EdgeSpec::new("D", "A", 1.0),
            ],
        )
        .unwrap();
        let coloring = color_graph(&graph);
        assert_eq!(coloring.chromatic_count, 2);
        assert!(validate_coloring(&graph, &coloring));
        assert!(coloring_violations(&graph, &coloring).is_empty());
        assert_eq!(analyze_coloring(&graph, &coloring).colors_used, 2);
    }

    #[test]
    fn test_star_failure_scenario() {
        let mut graph = build_graph(
            ["H", "L1", "L2", "L3"],
            [
                EdgeSpec::new("H", "L1", 1.0),
                EdgeSpec::new("H", "L2", 1.0),
                EdgeSpec::new("H", "L3", 1.0).vulnerable(),
            ],
        )
        .unwrap();
        let active_before: Vec<_> = graph.active_nodes().into_iter().cloned().collect();

        let report = simulate_node_failure(&mut graph, &"H").unwrap();
        assert_eq!(report.disconnected, vec!["L1", "L2", "L3"]);
        assert_eq!(report.impact_percent, 100.0);

        let active_after: Vec<_> = graph.active_nodes().into_iter().cloned().collect();
        assert_eq!(active_after, active_before);
        assert!(graph.is_active(&"H"));

        let rounds = simulate_cascade(&mut graph, &["H"]).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].active_remaining, 0);
    }

    #[test]
    fn test_k_disjoint_and_rebalance() {
        let paths = k_disjoint_paths(&network(), &0, &3, 4).unwrap();
        assert_eq!(paths.len(), 2);

        let skewed: crate::tree::bst::SearchTree<u32> = (1..=31).collect();
        let result = rebalance_tree(&skewed);
        assert_eq!(result.height_before, 31);
        assert_eq!(result.height_after, 5);
    }
}
