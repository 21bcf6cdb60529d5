//! Route finding - shortest paths, fewest-hop paths and alternative routes

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::model::{EdgePolicy, Graph, NodeIndex, NodeKey};
use crate::config::ReliabilityConfig;
use crate::{NetworkError, Result};

/// A route through the network, source and target included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult<K> {
    pub nodes: Vec<K>,
    pub total_weight: f64,
}

impl<K: NodeKey> PathResult<K> {
    /// Number of edges traversed
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consecutive node pairs along the route
    pub fn hops(&self) -> impl Iterator<Item = (&K, &K)> + '_ {
        self.nodes.windows(2).map(|w| (&w[0], &w[1]))
    }
}

/// Search strategy for a single route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathAlgorithm {
    /// Minimum total weight
    #[default]
    Dijkstra,
    /// Minimum number of hops, ignoring weights
    BreadthFirst,
}

/// Distances and predecessors from a single source
pub(crate) struct ShortestPathTree {
    pub(crate) dist: Vec<f64>,
    pred: Vec<Option<NodeIndex>>,
}

/// Engine for route computations over the active subgraph
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEngine {
    policy: EdgePolicy,
}

impl PathEngine {
    pub fn new(policy: EdgePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    /// Find a route with the chosen algorithm
    pub fn find<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        from: &K,
        to: &K,
        algorithm: PathAlgorithm,
    ) -> Result<PathResult<K>> {
        match algorithm {
            PathAlgorithm::Dijkstra => self.shortest_path(graph, from, to),
            PathAlgorithm::BreadthFirst => self.fewest_hops(graph, from, to),
        }
    }

    fn endpoints<K: NodeKey>(
        graph: &Graph<K>,
        from: &K,
        to: &K,
    ) -> Result<(NodeIndex, NodeIndex)> {
        match (graph.node_index(from), graph.node_index(to)) {
            (Some(source), Some(target))
                if graph.is_active_at(source) && graph.is_active_at(target) =>
            {
                Ok((source, target))
            }
            _ => Err(NetworkError::no_path(from, to)),
        }
    }

    /// Dijkstra's algorithm in its dense form
    ///
    /// Each step scans every unvisited active node for the minimum tentative
    /// distance, lowest insertion index first on ties.
    pub fn shortest_path<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        from: &K,
        to: &K,
    ) -> Result<PathResult<K>> {
        let (source, target) = Self::endpoints(graph, from, to)?;
        let tree = self.dijkstra(graph, source, Some(target));

        if !tree.dist[target].is_finite() {
            return Err(NetworkError::no_path(from, to));
        }

        let mut nodes = vec![graph.key(target).clone()];
        let mut current = target;
        while let Some(prev) = tree.pred[current] {
            nodes.push(graph.key(prev).clone());
            current = prev;
        }
        nodes.reverse();

        tracing::debug!(
            "Shortest path {} -> {}: {} hops, weight {}",
            from,
            to,
            nodes.len() - 1,
            tree.dist[target]
        );

        Ok(PathResult {
            nodes,
            total_weight: tree.dist[target],
        })
    }

    pub(crate) fn dijkstra<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        source: NodeIndex,
        target: Option<NodeIndex>,
    ) -> ShortestPathTree {
        let n = graph.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut pred = vec![None; n];
        let mut visited = vec![false; n];
        dist[source] = 0.0;

        loop {
            let mut current = None;
            let mut best = f64::INFINITY;
            for node in 0..n {
                if !visited[node] && graph.is_active_at(node) && dist[node] < best {
                    best = dist[node];
                    current = Some(node);
                }
            }

            let Some(node) = current else {
                break;
            };
            visited[node] = true;
            if Some(node) == target {
                break;
            }

            for (neighbor, edge) in graph.traversable_adjacent(node, self.policy) {
                if visited[neighbor] {
                    continue;
                }
                let candidate = dist[node] + graph.edge(edge).weight;
                if candidate < dist[neighbor] {
                    tracing::trace!(
                        "relax {} via {}: {} -> {}",
                        graph.key(neighbor),
                        graph.key(node),
                        dist[neighbor],
                        candidate
                    );
                    dist[neighbor] = candidate;
                    pred[neighbor] = Some(node);
                }
            }
        }

        ShortestPathTree { dist, pred }
    }

    /// Weighted distance from `from` to every node it can reach
    pub fn distances_from<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        from: &K,
    ) -> Result<Vec<(K, f64)>> {
        let source = graph
            .node_index(from)
            .filter(|&s| graph.is_active_at(s))
            .ok_or_else(|| NetworkError::node_not_found(from))?;
        let tree = self.dijkstra(graph, source, None);
        Ok(tree
            .dist
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .map(|(i, d)| (graph.key(i).clone(), *d))
            .collect())
    }

    /// Breadth-first search for the route with the fewest hops
    ///
    /// The reported weight is the sum of the traversed edge weights.
    pub fn fewest_hops<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        from: &K,
        to: &K,
    ) -> Result<PathResult<K>> {
        let (source, target) = Self::endpoints(graph, from, to)?;

        let mut parent: Vec<Option<(NodeIndex, f64)>> = vec![None; graph.node_count()];
        let mut seen = vec![false; graph.node_count()];
        let mut queue = VecDeque::from([source]);
        seen[source] = true;

        while let Some(node) = queue.pop_front() {
            if node == target {
                let mut nodes = vec![graph.key(target).clone()];
                let mut total_weight = 0.0;
                let mut current = target;
                while let Some((prev, weight)) = parent[current] {
                    nodes.push(graph.key(prev).clone());
                    total_weight += weight;
                    current = prev;
                }
                nodes.reverse();
                return Ok(PathResult {
                    nodes,
                    total_weight,
                });
            }

            for (neighbor, edge) in graph.traversable_adjacent(node, self.policy) {
                if !seen[neighbor] {
                    seen[neighbor] = true;
                    parent[neighbor] = Some((node, graph.edge(edge).weight));
                    queue.push_back(neighbor);
                }
            }
        }

        Err(NetworkError::no_path(from, to))
    }

    /// Enumerate up to `max_paths` simple routes depth-first
    pub fn all_simple_paths<K: NodeKey>(
        &self,
        graph: &Graph<K>,
        from: &K,
        to: &K,
        max_paths: usize,
    ) -> Vec<PathResult<K>> {
        let Ok((source, target)) = Self::endpoints(graph, from, to) else {
            return Vec::new();
        };

        let mut search = SimplePathSearch {
            graph,
            policy: self.policy,
            target,
            max_paths,
            visited: vec![false; graph.node_count()],
            current: Vec::new(),
            weight: 0.0,
            found: Vec::new(),
        };
        search.visit(source);
        search.found
    }
}

struct SimplePathSearch<'g, K: NodeKey> {
    graph: &'g Graph<K>,
    policy: EdgePolicy,
    target: NodeIndex,
    max_paths: usize,
    visited: Vec<bool>,
    current: Vec<NodeIndex>,
    weight: f64,
    found: Vec<PathResult<K>>,
}

impl<K: NodeKey> SimplePathSearch<'_, K> {
    fn visit(&mut self, node: NodeIndex) {
        if self.found.len() >= self.max_paths {
            return;
        }

        self.visited[node] = true;
        self.current.push(node);

        if node == self.target {
            self.found.push(PathResult {
                nodes: self.current.iter().map(|&i| self.graph.key(i).clone()).collect(),
                total_weight: self.weight,
            });
        } else {
            let graph = self.graph;
            for (neighbor, edge) in graph.traversable_adjacent(node, self.policy) {
                if !self.visited[neighbor] {
                    let weight = graph.edge(edge).weight;
                    self.weight += weight;
                    self.visit(neighbor);
                    self.weight -= weight;
                }
            }
        }

        self.current.pop();
        self.visited[node] = false;
    }
}

/// Probability that every edge of `path` stays up
///
/// Returns `None` when consecutive nodes are not joined by an edge.
pub fn path_reliability<K: NodeKey>(
    graph: &Graph<K>,
    path: &[K],
    config: &ReliabilityConfig,
) -> Option<f64> {
    path.windows(2).try_fold(1.0, |acc, hop| {
        let edge = graph.edge_between(&hop[0], &hop[1])?;
        let survival = if edge.vulnerable {
            config.vulnerable
        } else {
            config.healthy
        };
        Some(acc * survival)
    })
}
