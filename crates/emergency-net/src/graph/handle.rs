//! Shared network handle for concurrent analysis requests
//!
//! Read-only analyses share a read lock. Failure simulations hold the write
//! lock across the whole disable, measure and restore sequence, so no other
//! caller can observe a node or edge that is only temporarily switched off.

use std::sync::Arc;

use parking_lot::RwLock;

use super::coloring::{ColoringEngine, ColoringResult};
use super::disjoint::DisjointPathFinder;
use super::failure::{CascadeRound, FailureAnalyzer, FailureReport};
use super::metrics::{GraphMetrics, NetworkSummary};
use super::model::{Graph, NodeKey};
use super::mst::{MstResult, SpanningTreeBuilder};
use super::paths::{path_reliability, PathAlgorithm, PathEngine, PathResult};
use crate::config::AnalysisConfig;
use crate::Result;

/// Cloneable handle to one network shared between callers
#[derive(Debug, Clone)]
pub struct NetworkHandle<K: NodeKey> {
    graph: Arc<RwLock<Graph<K>>>,
    config: Arc<AnalysisConfig>,
}

impl<K: NodeKey> NetworkHandle<K> {
    pub fn new(graph: Graph<K>) -> Self {
        Self::with_config(graph, AnalysisConfig::default())
    }

    pub fn with_config(graph: Graph<K>, config: AnalysisConfig) -> Self {
        Self {
            graph: Arc::new(RwLock::new(graph)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run `f` under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Graph<K>) -> R) -> R {
        f(&self.graph.read())
    }

    /// Run `f` under the write lock; use this for lasting changes to the network
    pub fn update<R>(&self, f: impl FnOnce(&mut Graph<K>) -> R) -> R {
        f(&mut self.graph.write())
    }

    /// Independent copy of the current graph
    pub fn snapshot(&self) -> Graph<K> {
        self.graph.read().clone()
    }

    pub fn minimum_spanning_tree(&self) -> Result<MstResult<K>> {
        SpanningTreeBuilder::kruskal(&self.graph.read())
    }

    pub fn find_path(&self, from: &K, to: &K, algorithm: PathAlgorithm) -> Result<PathResult<K>> {
        PathEngine::new(self.config.edge_policy).find(&self.graph.read(), from, to, algorithm)
    }

    /// Up to `max_alternative_paths` simple routes between two nodes
    pub fn alternative_routes(&self, from: &K, to: &K) -> Vec<PathResult<K>> {
        PathEngine::new(self.config.edge_policy).all_simple_paths(
            &self.graph.read(),
            from,
            to,
            self.config.max_alternative_paths,
        )
    }

    /// Survival probability of `path` under the configured reliability model
    pub fn route_reliability(&self, path: &[K]) -> Option<f64> {
        path_reliability(&self.graph.read(), path, &self.config.reliability)
    }

    pub fn k_disjoint_paths(&self, from: &K, to: &K, k: usize) -> Result<Vec<PathResult<K>>> {
        DisjointPathFinder::new(self.config.edge_policy).k_disjoint_paths(
            &self.graph.read(),
            from,
            to,
            k,
        )
    }

    pub fn coloring(&self) -> ColoringResult<K> {
        ColoringEngine::welsh_powell(&self.graph.read())
    }

    pub fn summary(&self) -> NetworkSummary {
        GraphMetrics::summary(&self.graph.read())
    }

    fn analyzer(&self) -> FailureAnalyzer {
        FailureAnalyzer::new(self.config.as_ref().clone())
    }

    pub fn simulate_node_failure(&self, node: &K) -> Result<FailureReport<K>> {
        let mut graph = self.graph.write();
        self.analyzer().simulate_node_failure(&mut graph, node)
    }

    pub fn simulate_edge_failure(&self, from: &K, to: &K) -> Result<FailureReport<K>> {
        let mut graph = self.graph.write();
        self.analyzer().simulate_edge_failure(&mut graph, from, to)
    }

    pub fn simulate_cascade(&self, initial_failures: &[K]) -> Result<Vec<CascadeRound<K>>> {
        let mut graph = self.graph.write();
        self.analyzer().simulate_cascade(&mut graph, initial_failures)
    }

    pub fn critical_nodes(&self) -> Result<Vec<FailureReport<K>>> {
        let mut graph = self.graph.write();
        self.analyzer().critical_nodes(&mut graph)
    }
}
