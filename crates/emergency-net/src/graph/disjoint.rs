//! Edge-disjoint redundant routes via augmenting paths over a residual network

use std::collections::VecDeque;

use super::model::{EdgeIndex, EdgePolicy, Graph, NodeIndex, NodeKey};
use super::paths::PathResult;
use crate::{NetworkError, Result};

/// Finds up to K routes that share no edge
///
/// Every usable undirected edge carries one unit of capacity. Flow on an edge
/// is stored as a signed unit relative to the edge's `from` endpoint, so a
/// later augmenting path can cancel flow pushed by an earlier one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisjointPathFinder {
    policy: EdgePolicy,
}

impl DisjointPathFinder {
    pub fn new(policy: EdgePolicy) -> Self {
        Self { policy }
    }

    /// Up to `k` pairwise edge-disjoint routes from `from` to `to`
    ///
    /// Fewer than `k` routes are returned when the edge connectivity between
    /// the endpoints is lower. Routes are ordered by weight, then hop count.
    pub fn k_disjoint_paths<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        from: &K,
        to: &K,
        k: usize,
    ) -> Result<Vec<PathResult<K>>> {
        let (source, target) = match (graph.node_index(from), graph.node_index(to)) {
            (Some(s), Some(t)) if graph.is_active_at(s) && graph.is_active_at(t) => (s, t),
            _ => return Err(NetworkError::no_path(from, to)),
        };

        if k == 0 {
            return Ok(Vec::new());
        }
        if source == target {
            return Ok(vec![PathResult {
                nodes: vec![from.clone()],
                total_weight: 0.0,
            }]);
        }

        let mut flow = vec![0i8; graph.edge_count()];
        let mut found = 0;
        while found < k {
            let Some(augmenting) = self.augmenting_path(graph, &flow, source, target) else {
                break;
            };
            for (node, edge) in augmenting {
                if graph.edge(edge).from == node {
                    flow[edge] += 1;
                } else {
                    flow[edge] -= 1;
                }
            }
            found += 1;
        }

        let mut paths: Vec<_> = (0..found)
            .filter_map(|_| self.extract_path(graph, &mut flow, source, target))
            .collect();
        paths.sort_by(|a, b| {
            a.total_weight
                .total_cmp(&b.total_weight)
                .then(a.hop_count().cmp(&b.hop_count()))
        });

        tracing::debug!(
            "Found {} of {} requested edge-disjoint paths {} -> {}",
            paths.len(),
            k,
            from,
            to
        );
        Ok(paths)
    }

    /// Flow already sent from `node` across `edge`, in {-1, 0, 1}
    fn outgoing<K: NodeKey>(
        graph: &Graph<K>,
        flow: &[i8],
        node: NodeIndex,
        edge: EdgeIndex,
    ) -> i8 {
        if graph.edge(edge).from == node {
            flow[edge]
        } else {
            -flow[edge]
        }
    }

    /// BFS over the residual network; returns the `(tail, edge)` hops of the path
    fn augmenting_path<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        flow: &[i8],
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<Vec<(NodeIndex, EdgeIndex)>> {
        let mut parent: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; graph.node_count()];
        let mut seen = vec![false; graph.node_count()];
        let mut queue = VecDeque::from([source]);
        seen[source] = true;

        while let Some(node) = queue.pop_front() {
            for (neighbor, edge) in graph.traversable_adjacent(node, self.policy) {
                if seen[neighbor] || Self::outgoing(graph, flow, node, edge) >= 1 {
                    continue;
                }
                seen[neighbor] = true;
                parent[neighbor] = Some((node, edge));
                if neighbor == target {
                    let mut hops = Vec::new();
                    let mut current = target;
                    while let Some((prev, edge)) = parent[current] {
                        hops.push((prev, edge));
                        current = prev;
                    }
                    hops.reverse();
                    return Some(hops);
                }
                queue.push_back(neighbor);
            }
        }

        None
    }

    /// Peel one source-to-target route off the net flow, consuming its edges
    ///
    /// Always follows the earliest-inserted edge carrying outgoing flow. Flow
    /// cycles met on the way are consumed and cut out of the route.
    fn extract_path<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        flow: &mut [i8],
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<PathResult<K>> {
        let mut nodes = vec![source];
        let mut weights: Vec<f64> = Vec::new();
        let mut current = source;

        while current != target {
            let (next, edge) = graph
                .traversable_adjacent(current, self.policy)
                .find(|&(_, e)| Self::outgoing(graph, &*flow, current, e) == 1)?;
            flow[edge] = 0;

            if let Some(position) = nodes.iter().position(|&n| n == next) {
                nodes.truncate(position + 1);
                weights.truncate(position);
            } else {
                nodes.push(next);
                weights.push(graph.edge(edge).weight);
            }
            current = next;
        }

        Some(PathResult {
            nodes: nodes.into_iter().map(|i| graph.key(i).clone()).collect(),
            total_weight: weights.iter().sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::EdgeSpec;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn create_test_graph() -> Graph<u32> {
        Graph::from_edges(
            0..4,
            [(0, 1, 4.0), (0, 2, 2.0), (1, 2, 1.0), (1, 3, 5.0), (2, 3, 8.0)],
        )
        .unwrap()
    }

    fn edge_set<K: NodeKey>(path: &PathResult<K>) -> HashSet<(K, K)> {
        path.hops()
            .map(|(a, b)| {
                if a <= b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                }
            })
            .collect()
    }

    fn assert_valid_disjoint<K: NodeKey>(
        graph: &Graph<K>,
        paths: &[PathResult<K>],
        from: &K,
        to: &K,
    ) {
        for path in paths {
            assert_eq!(path.nodes.first(), Some(from));
            assert_eq!(path.nodes.last(), Some(to));
            let unique: HashSet<_> = path.nodes.iter().collect();
            assert_eq!(unique.len(), path.len(), "path revisits a node");
            for (a, b) in path.hops() {
                let edge = graph.edge_index_between(a, b).expect("hop must be an edge");
                assert!(graph.is_edge_usable(edge));
            }
        }
        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                assert!(edge_set(a).is_disjoint(&edge_set(b)));
            }
        }
    }

    #[test]
    fn test_two_disjoint_paths() {
        let graph = create_test_graph();
        let paths = DisjointPathFinder::default()
            .k_disjoint_paths(&graph, &0, &3, 5)
            .unwrap();
        assert_eq!(paths.len(), 2);
        assert_valid_disjoint(&graph, &paths, &0, &3);
        assert!(paths[0].total_weight <= paths[1].total_weight);
    }

    #[test]
    fn test_later_path_reroutes_earlier_choice() {
        let graph = Graph::from_edges(
            ["s", "a", "b", "t", "x", "y"],
            [
                ("s", "a", 1.0),
                ("a", "b", 1.0),
                ("b", "t", 1.0),
                ("s", "x", 1.0),
                ("x", "b", 1.0),
                ("a", "y", 1.0),
                ("y", "t", 1.0),
            ],
        )
        .unwrap();

        let paths = DisjointPathFinder::default()
            .k_disjoint_paths(&graph, &"s", &"t", 2)
            .unwrap();
        let routes: Vec<_> = paths.iter().map(|p| p.nodes.clone()).collect();
        assert_eq!(routes, vec![vec!["s", "a", "y", "t"], vec!["s", "x", "b", "t"]]);
    }

    #[test]
    fn test_respects_k_and_disabled_edges() {
        let mut graph = create_test_graph();
        let finder = DisjointPathFinder::default();
        assert_eq!(finder.k_disjoint_paths(&graph, &0, &3, 1).unwrap().len(), 1);
        assert!(finder.k_disjoint_paths(&graph, &0, &3, 0).unwrap().is_empty());

        graph.set_edge_active(&2, &3, false).unwrap();
        let paths = finder.k_disjoint_paths(&graph, &0, &3, 3).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes, vec![0, 1, 3]);
    }

    #[test]
    fn test_endpoints() {
        let mut graph = create_test_graph();
        graph.add_node(9);
        let finder = DisjointPathFinder::default();

        assert!(finder.k_disjoint_paths(&graph, &0, &9, 2).unwrap().is_empty());
        assert_eq!(finder.k_disjoint_paths(&graph, &1, &1, 2).unwrap()[0].nodes, vec![1]);

        graph.set_active(&3, false).unwrap();
        assert!(matches!(
            finder.k_disjoint_paths(&graph, &0, &3, 2),
            Err(NetworkError::NoPath { .. })
        ));
    }

    /// Minimum number of edges separating `s` from `t`, by trying every cut
    fn edge_connectivity(n: u32, edges: &[(u32, u32, f64)], s: u32, t: u32) -> usize {
        let others: Vec<u32> = (0..n).filter(|&v| v != s && v != t).collect();
        (0u32..(1 << others.len()))
            .map(|mask| {
                let mut side: HashSet<u32> = HashSet::from([s]);
                for (i, v) in others.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        side.insert(*v);
                    }
                }
                edges
                    .iter()
                    .filter(|(a, b, _)| side.contains(a) != side.contains(b))
                    .count()
            })
            .min()
            .unwrap_or(0)
    }

    #[test]
    fn test_count_matches_minimum_cut() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..50 {
            let n = rng.gen_range(2..=6u32);
            let mut edges = Vec::new();
            for a in 0..n {
                for b in (a + 1)..n {
                    if rng.gen_bool(0.55) {
                        edges.push((a, b, rng.gen_range(1..10) as f64, rng.gen_bool(0.3)));
                    }
                }
            }
            let specs = edges.iter().map(|&(a, b, w, vulnerable)| {
                let spec = EdgeSpec::new(a, b, w);
                if vulnerable {
                    spec.vulnerable()
                } else {
                    spec
                }
            });
            let graph = Graph::build(0..n, specs).unwrap();
            let target = n - 1;

            for policy in [EdgePolicy::IncludeVulnerable, EdgePolicy::AvoidVulnerable] {
                let usable: Vec<_> = edges
                    .iter()
                    .filter(|e| policy == EdgePolicy::IncludeVulnerable || !e.3)
                    .map(|&(a, b, w, _)| (a, b, w))
                    .collect();
                let connectivity = edge_connectivity(n, &usable, 0, target);
                let finder = DisjointPathFinder::new(policy);

                let all = finder.k_disjoint_paths(&graph, &0, &target, usize::MAX).unwrap();
                assert_valid_disjoint(&graph, &all, &0, &target);
                assert_eq!(all.len(), connectivity);

                for k in 1..=connectivity {
                    let paths = finder.k_disjoint_paths(&graph, &0, &target, k).unwrap();
                    assert_eq!(paths.len(), k);
                    assert_valid_disjoint(&graph, &paths, &0, &target);
                    if policy == EdgePolicy::AvoidVulnerable {
                        assert!(paths
                            .iter()
                            .flat_map(|p| p.hops())
                            .all(|(a, b)| !graph.is_vulnerable(a, b)));
                    }
                }
            }
        }
    }
}
