//! Frequency planning via greedy graph coloring
//!
//! Adjacent hubs must not share a channel. Colors are small integers starting
//! at 0; [`ColoringEngine::frequency_band`] maps them to band labels.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::model::{Graph, NodeIndex, NodeKey};

/// Order in which the greedy coloring visits nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColoringStrategy {
    /// Degree descending, ties by node key ascending
    #[default]
    WelshPowell,
    /// Reverse insertion order
    ReverseInsertion,
}

/// Color assignment for the active nodes of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoringResult<K: NodeKey> {
    /// Node to color, in graph insertion order
    pub colors: IndexMap<K, usize>,
    /// Largest color plus one; 0 for an empty graph
    pub chromatic_count: usize,
    pub strategy: ColoringStrategy,
}

impl<K: NodeKey> ColoringResult<K> {
    pub fn color_of(&self, node: &K) -> Option<usize> {
        self.colors.get(node).copied()
    }

    /// Nodes grouped by color; each group is an independent set
    pub fn color_classes(&self) -> Vec<Vec<K>> {
        let mut classes = vec![Vec::new(); self.chromatic_count];
        for (node, &color) in &self.colors {
            if let Some(class) = classes.get_mut(color) {
                class.push(node.clone());
            }
        }
        classes
    }
}

/// A reason a coloring is not valid for a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColoringViolation<K> {
    /// Both endpoints of an active edge share a color
    SameColor(K, K),
    /// An active node has no color
    Uncolored(K),
}

/// Summary of how good a coloring is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoringAnalysis {
    pub chromatic_count: usize,
    /// Distinct colors actually assigned
    pub colors_used: usize,
    pub max_degree: usize,
    pub average_degree: f64,
    /// Greedy coloring never needs more than `max_degree + 1` colors
    pub upper_bound: usize,
    /// Colors any proper coloring needs: 0 empty, 1 without edges, 3 with a triangle, else 2
    pub theoretical_minimum: usize,
    /// `theoretical_minimum / chromatic_count` as a percentage
    pub efficiency: f64,
    pub is_valid: bool,
}

/// Greedy graph coloring and coloring checks
pub struct ColoringEngine;

impl ColoringEngine {
    /// Welsh-Powell greedy coloring of the active subgraph
    pub fn welsh_powell<K: NodeKey>(graph: &Graph<K>) -> ColoringResult<K> {
        Self::color(graph, ColoringStrategy::WelshPowell)
    }

    pub fn color<K: NodeKey>(graph: &Graph<K>, strategy: ColoringStrategy) -> ColoringResult<K> {
        let mut order: Vec<NodeIndex> = graph.active_node_indices().collect();
        match strategy {
            ColoringStrategy::WelshPowell => {
                let degrees: Vec<usize> = (0..graph.node_count())
                    .map(|n| graph.active_degree(n))
                    .collect();
                order.sort_by(|a, b| {
                    degrees[*b]
                        .cmp(&degrees[*a])
                        .then_with(|| graph.key(*a).cmp(graph.key(*b)))
                });
            }
            ColoringStrategy::ReverseInsertion => order.reverse(),
        }

        let mut assigned: Vec<Option<usize>> = vec![None; graph.node_count()];
        for &node in &order {
            let mut taken = vec![false; graph.active_degree(node) + 1];
            for (neighbor, _) in graph.active_adjacent(node) {
                if let Some(color) = assigned[neighbor] {
                    if color < taken.len() {
                        taken[color] = true;
                    }
                }
            }
            let color = taken.iter().position(|t| !t).unwrap_or(taken.len());
            tracing::trace!("{} gets color {}", graph.key(node), color);
            assigned[node] = Some(color);
        }

        let colors: IndexMap<K, usize> = assigned
            .iter()
            .enumerate()
            .filter_map(|(n, c)| c.map(|c| (graph.key(n).clone(), c)))
            .collect();
        let chromatic_count = colors.values().max().map_or(0, |m| m + 1);

        tracing::debug!(
            "{:?} coloring uses {} colors for {} nodes",
            strategy,
            chromatic_count,
            colors.len()
        );

        ColoringResult {
            colors,
            chromatic_count,
            strategy,
        }
    }

    /// One coloring per strategy, Welsh-Powell first
    pub fn all_strategies<K: NodeKey>(graph: &Graph<K>) -> Vec<ColoringResult<K>> {
        [ColoringStrategy::WelshPowell, ColoringStrategy::ReverseInsertion]
            .into_iter()
            .map(|strategy| Self::color(graph, strategy))
            .collect()
    }

    /// Run every strategy and keep the one with the fewest colors
    ///
    /// Welsh-Powell wins ties.
    pub fn best_coloring<K: NodeKey>(graph: &Graph<K>) -> ColoringResult<K> {
        Self::all_strategies(graph)
            .into_iter()
            .reduce(|best, next| {
                if next.chromatic_count < best.chromatic_count {
                    next
                } else {
                    best
                }
            })
            .unwrap_or_else(|| Self::welsh_powell(graph))
    }

    /// Every way `coloring` fails to be a proper coloring of the active subgraph
    pub fn violations<K: NodeKey>(
        graph: &Graph<K>,
        coloring: &ColoringResult<K>,
    ) -> Vec<ColoringViolation<K>> {
        let mut violations: Vec<_> = graph
            .active_node_indices()
            .map(|n| graph.key(n))
            .filter(|k| !coloring.colors.contains_key(*k))
            .map(|k| ColoringViolation::Uncolored(k.clone()))
            .collect();

        for edge in graph.active_edges() {
            let colors = (coloring.color_of(&edge.from), coloring.color_of(&edge.to));
            if let (Some(a), Some(b)) = colors {
                if a == b {
                    violations.push(ColoringViolation::SameColor(edge.from, edge.to));
                }
            }
        }
        violations
    }

    pub fn is_valid<K: NodeKey>(graph: &Graph<K>, coloring: &ColoringResult<K>) -> bool {
        Self::violations(graph, coloring).is_empty()
    }

    /// Greedy independent set, lowest degree first
    pub fn greedy_independent_set<K: NodeKey>(graph: &Graph<K>) -> Vec<K> {
        let mut order: Vec<NodeIndex> = graph.active_node_indices().collect();
        order.sort_by_key(|&n| graph.active_degree(n));

        let mut blocked = vec![false; graph.node_count()];
        let mut chosen = Vec::new();
        for node in order {
            if blocked[node] {
                continue;
            }
            blocked[node] = true;
            for (neighbor, _) in graph.active_adjacent(node) {
                blocked[neighbor] = true;
            }
            chosen.push(graph.key(node).clone());
        }
        chosen
    }

    pub fn analyze<K: NodeKey>(
        graph: &Graph<K>,
        coloring: &ColoringResult<K>,
    ) -> ColoringAnalysis {
        let degrees: Vec<usize> = graph
            .active_node_indices()
            .map(|n| graph.active_degree(n))
            .collect();
        let max_degree = degrees.iter().copied().max().unwrap_or(0);
        let average_degree = if degrees.is_empty() {
            0.0
        } else {
            degrees.iter().sum::<usize>() as f64 / degrees.len() as f64
        };
        let mut distinct: Vec<usize> = coloring.colors.values().copied().collect();
        distinct.sort_unstable();
        distinct.dedup();

        let theoretical_minimum = if degrees.is_empty() {
            0
        } else if max_degree == 0 {
            1
        } else if Self::has_triangle(graph) {
            3
        } else {
            2
        };
        let efficiency = if coloring.chromatic_count == 0 {
            100.0
        } else {
            theoretical_minimum as f64 / coloring.chromatic_count as f64 * 100.0
        };

        ColoringAnalysis {
            chromatic_count: coloring.chromatic_count,
            colors_used: distinct.len(),
            max_degree,
            average_degree,
            upper_bound: max_degree + 1,
            theoretical_minimum,
            efficiency,
            is_valid: Self::is_valid(graph, coloring),
        }
    }

    fn has_triangle<K: NodeKey>(graph: &Graph<K>) -> bool {
        graph.active_edge_indices().any(|e| {
            let edge = graph.edge(e);
            let around: HashSet<NodeIndex> =
                graph.active_adjacent(edge.from).map(|(n, _)| n).collect();
            graph
                .active_adjacent(edge.to)
                .any(|(n, _)| n != edge.from && around.contains(&n))
        })
    }

    /// Radio band label for a color index
    pub fn frequency_band(color: usize) -> String {
        match color {
            0 => "Band A (2.4 GHz)".to_string(),
            1 => "Band B (5 GHz)".to_string(),
            2 => "Band C (6 GHz)".to_string(),
            3 => "Band D (28 GHz)".to_string(),
            4 => "Band E (39 GHz)".to_string(),
            c if c < 26 => {
                let letter = char::from(b'A' + c as u8);
                format!("Band {} ({} MHz)", letter, c * 100)
            }
            c => format!("Band {} ({} MHz)", c, c * 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn four_cycle() -> Graph<&'static str> {
        Graph::from_edges(
            ["A", "B", "C", "D"],
            [("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0), ("D", "A", 1.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_bipartite_cycle_uses_two_colors() {
        let graph = four_cycle();
        let result = ColoringEngine::welsh_powell(&graph);
        assert_eq!(result.chromatic_count, 2);
        assert_eq!(result.color_of(&"A"), Some(0));
        assert_eq!(result.color_of(&"B"), Some(1));
        assert_eq!(result.color_of(&"C"), Some(0));
        assert_eq!(result.color_of(&"D"), Some(1));
        assert!(ColoringEngine::is_valid(&graph, &result));
        assert_eq!(result.color_classes(), vec![vec!["A", "C"], vec!["B", "D"]]);
    }

    #[test]
    fn test_triangle_needs_three_colors() {
        let graph = Graph::from_edges(0..3, [(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0)]).unwrap();
        let result = ColoringEngine::welsh_powell(&graph);
        assert_eq!(result.chromatic_count, 3);
    }

    #[test]
    fn test_highest_degree_colored_first() {
        let graph = Graph::from_edges(
            ["L1", "L2", "H"],
            [("H", "L1", 1.0), ("H", "L2", 1.0)],
        )
        .unwrap();
        let result = ColoringEngine::welsh_powell(&graph);
        assert_eq!(result.color_of(&"H"), Some(0));
        assert_eq!(result.color_of(&"L1"), Some(1));
        assert_eq!(result.chromatic_count, 2);
    }

    #[test]
    fn test_inactive_nodes_are_skipped() {
        let mut graph = four_cycle();
        graph.set_active(&"C", false).unwrap();
        let result = ColoringEngine::welsh_powell(&graph);
        assert_eq!(result.colors.len(), 3);
        assert_eq!(result.color_of(&"C"), None);
        assert!(ColoringEngine::is_valid(&graph, &result));
    }

    #[test]
    fn test_violations() {
        let graph = four_cycle();
        let mut result = ColoringEngine::welsh_powell(&graph);
        result.colors.insert("B", 0);
        result.colors.shift_remove("D");

        let violations = ColoringEngine::violations(&graph, &result);
        assert!(violations.contains(&ColoringViolation::Uncolored("D")));
        assert!(violations.contains(&ColoringViolation::SameColor("A", "B")));
        assert!(violations.contains(&ColoringViolation::SameColor("B", "C")));
        assert_eq!(violations.len(), 3);
        assert!(!ColoringEngine::is_valid(&graph, &result));
    }

    #[test]
    fn test_best_coloring_prefers_welsh_powell_on_ties() {
        let graph = four_cycle();
        let best = ColoringEngine::best_coloring(&graph);
        assert_eq!(best.strategy, ColoringStrategy::WelshPowell);
        let reverse = ColoringEngine::color(&graph, ColoringStrategy::ReverseInsertion);
        assert!(best.chromatic_count <= reverse.chromatic_count);

        let all = ColoringEngine::all_strategies(&graph);
        let strategies: Vec<_> = all.iter().map(|r| r.strategy).collect();
        assert_eq!(
            strategies,
            vec![ColoringStrategy::WelshPowell, ColoringStrategy::ReverseInsertion]
        );
        assert!(all.iter().all(|r| ColoringEngine::is_valid(&graph, r)));
    }

    #[test]
    fn test_analysis_lower_bound_and_efficiency() {
        let triangle = Graph::from_edges(
            ["A", "B", "C"],
            [("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)],
        )
        .unwrap();
        let analysis = ColoringEngine::analyze(&triangle, &ColoringEngine::welsh_powell(&triangle));
        assert_eq!(analysis.theoretical_minimum, 3);
        assert_eq!(analysis.efficiency, 100.0);

        let cycle = four_cycle();
        let analysis = ColoringEngine::analyze(&cycle, &ColoringEngine::welsh_powell(&cycle));
        assert_eq!(analysis.theoretical_minimum, 2);
        assert_eq!(analysis.efficiency, 100.0);

        let mut lonely = Graph::new();
        lonely.add_node("A");
        let analysis = ColoringEngine::analyze(&lonely, &ColoringEngine::welsh_powell(&lonely));
        assert_eq!(analysis.theoretical_minimum, 1);

        let empty: Graph<&str> = Graph::new();
        let analysis = ColoringEngine::analyze(&empty, &ColoringEngine::welsh_powell(&empty));
        assert_eq!(analysis.theoretical_minimum, 0);
        assert_eq!(analysis.efficiency, 100.0);
    }

    #[test]
    fn test_independent_set_and_analysis() {
        let graph = Graph::from_edges(
            ["H", "L1", "L2", "L3"],
            [("H", "L1", 1.0), ("H", "L2", 1.0), ("H", "L3", 1.0)],
        )
        .unwrap();
        assert_eq!(
            ColoringEngine::greedy_independent_set(&graph),
            vec!["L1", "L2", "L3"]
        );

        let coloring = ColoringEngine::welsh_powell(&graph);
        let analysis = ColoringEngine::analyze(&graph, &coloring);
        assert_eq!(analysis.max_degree, 3);
        assert_eq!(analysis.upper_bound, 4);
        assert_eq!(analysis.colors_used, 2);
        assert_eq!(analysis.average_degree, 1.5);
        assert!(analysis.is_valid);
    }

    #[test]
    fn test_frequency_band() {
        assert_eq!(ColoringEngine::frequency_band(0), "Band A (2.4 GHz)");
        assert_eq!(ColoringEngine::frequency_band(5), "Band F (500 MHz)");
        assert_eq!(ColoringEngine::frequency_band(30), "Band 30 (3000 MHz)");
    }

    #[test]
    fn test_random_colorings_are_valid_and_bounded() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let n = rng.gen_range(1..=12u32);
            let mut edges = Vec::new();
            for a in 0..n {
                for b in (a + 1)..n {
                    if rng.gen_bool(0.35) {
                        edges.push((a, b, 1.0));
                    }
                }
            }
            let graph = Graph::from_edges(0..n, edges).unwrap();
            let max_degree = (0..graph.node_count())
                .map(|i| graph.active_degree(i))
                .max()
                .unwrap_or(0);

            for strategy in [ColoringStrategy::WelshPowell, ColoringStrategy::ReverseInsertion] {
                let result = ColoringEngine::color(&graph, strategy);
                assert!(ColoringEngine::is_valid(&graph, &result));
                assert!(result.chromatic_count <= max_degree + 1);
            }

            let independent = ColoringEngine::greedy_independent_set(&graph);
            for a in &independent {
                for b in &independent {
                    assert!(graph.edge_between(a, b).is_none());
                }
            }
        }
    }
}
