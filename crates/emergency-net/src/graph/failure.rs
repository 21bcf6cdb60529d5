//! Failure Analysis - Non-destructive what-if simulation of outages
//!
//! Every simulation disables nodes or edges through a scoped guard, measures
//! the damage, and restores the exact previous flags before returning, so the
//! caller's graph is observably unchanged.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::connectivity::Connectivity;
use super::model::{EdgeIndex, Graph, NodeIndex, NodeKey};
use crate::config::AnalysisConfig;
use crate::{NetworkError, Result};

/// Outcome of a simulated failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport<K> {
    pub disabled_nodes: Vec<K>,
    pub disabled_edges: Vec<(K, K)>,
    /// Surviving nodes that can no longer reach a survivor they reached before
    pub disconnected: Vec<K>,
    /// Surviving nodes left without any reachable peer
    pub isolated: Vec<K>,
    /// Share of survivors that were disconnected, in percent
    pub impact_percent: f64,
    /// Ordered survivor pairs that lost reachability
    pub lost_pairs: usize,
    pub connectivity_loss_percent: f64,
    /// Cascade triggered by the failure, when cascades are followed
    pub cascade_rounds: Vec<CascadeRound<K>>,
}

/// One round of a cascade failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeRound<K> {
    /// 1-based round number
    pub round: usize,
    pub newly_failed: Vec<K>,
    /// Active node count once this round's failures are applied
    pub active_remaining: usize,
}

/// Disables nodes and edges for the lifetime of the guard
///
/// Saved flags are restored in reverse order on drop, including during unwinding.
struct ScopedDisable<'g, K: NodeKey> {
    graph: &'g mut Graph<K>,
    nodes: Vec<(NodeIndex, bool)>,
    edges: Vec<(EdgeIndex, bool)>,
}

impl<'g, K: NodeKey> ScopedDisable<'g, K> {
    fn new(graph: &'g mut Graph<K>) -> Self {
        Self {
            graph,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn disable_node(&mut self, index: NodeIndex) {
        let previous = self.graph.set_active_at(index, false);
        self.nodes.push((index, previous));
    }

    fn disable_edge(&mut self, index: EdgeIndex) {
        let previous = self.graph.set_edge_active_at(index, false);
        self.edges.push((index, previous));
    }
}

impl<K: NodeKey> Deref for ScopedDisable<'_, K> {
    type Target = Graph<K>;

    fn deref(&self) -> &Graph<K> {
        self.graph
    }
}

impl<K: NodeKey> Drop for ScopedDisable<'_, K> {
    fn drop(&mut self) {
        for (index, previous) in self.edges.drain(..).rev() {
            self.graph.set_edge_active_at(index, previous);
        }
        for (index, previous) in self.nodes.drain(..).rev() {
            self.graph.set_active_at(index, previous);
        }
    }
}

/// Reachability snapshot taken before any failure is applied
struct Baseline {
    labels: Vec<Option<usize>>,
    sizes: Vec<usize>,
}

impl Baseline {
    fn capture<K: NodeKey>(graph: &Graph<K>) -> Self {
        let labels = Connectivity::component_labels(graph);
        let sizes = component_sizes(&labels, |_| true);
        Self { labels, sizes }
    }

    /// Peers `node` could reach before the failure
    fn peers(&self, node: NodeIndex) -> usize {
        self.labels[node].map_or(0, |l| self.sizes[l] - 1)
    }
}

fn component_sizes(labels: &[Option<usize>], include: impl Fn(NodeIndex) -> bool) -> Vec<usize> {
    let count = labels.iter().flatten().max().map_or(0, |m| m + 1);
    let mut sizes = vec![0; count];
    for (node, label) in labels.iter().enumerate() {
        if let Some(label) = label {
            if include(node) {
                sizes[*label] += 1;
            }
        }
    }
    sizes
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Failure and cascade simulator
#[derive(Debug, Clone, Default)]
pub struct FailureAnalyzer {
    config: AnalysisConfig,
}

impl FailureAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Simulate the loss of a single node
    pub fn simulate_node_failure<K: NodeKey>(
        &self,
        graph: &mut Graph<K>,
        node: &K,
    ) -> Result<FailureReport<K>> {
        self.simulate_nodes_failure(graph, std::slice::from_ref(node))
    }

    /// Simulate the simultaneous loss of several nodes
    pub fn simulate_nodes_failure<K: NodeKey>(
        &self,
        graph: &mut Graph<K>,
        nodes: &[K],
    ) -> Result<FailureReport<K>> {
        let indices = Self::resolve(graph, nodes)?;
        tracing::info!("Simulating failure of {} node(s)", indices.len());

        let baseline = Baseline::capture(graph);
        let mut guard = ScopedDisable::new(graph);
        for &index in &indices {
            guard.disable_node(index);
        }

        let mut report = self.measure(&*guard, &baseline);
        report.disabled_nodes = nodes.to_vec();
        if self.config.follow_cascade {
            report.cascade_rounds = self.run_cascade(&mut guard, &baseline);
        }
        drop(guard);

        tracing::info!(
            "Node failure impact: {} disconnected ({:.1}%), {} cascade round(s)",
            report.disconnected.len(),
            report.impact_percent,
            report.cascade_rounds.len()
        );
        Ok(report)
    }

    /// Simulate the loss of the link between `from` and `to`
    pub fn simulate_edge_failure<K: NodeKey>(
        &self,
        graph: &mut Graph<K>,
        from: &K,
        to: &K,
    ) -> Result<FailureReport<K>> {
        let edge = graph
            .edge_index_between(from, to)
            .ok_or_else(|| NetworkError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        tracing::info!("Simulating failure of link {}-{}", from, to);

        let baseline = Baseline::capture(graph);
        let mut guard = ScopedDisable::new(graph);
        guard.disable_edge(edge);

        let mut report = self.measure(&*guard, &baseline);
        report.disabled_edges = vec![(from.clone(), to.clone())];
        if self.config.follow_cascade {
            report.cascade_rounds = self.run_cascade(&mut guard, &baseline);
        }
        drop(guard);

        tracing::info!(
            "Link failure impact: {} disconnected ({:.1}%)",
            report.disconnected.len(),
            report.impact_percent
        );
        Ok(report)
    }

    /// Run a cascade from an initial failure set until no further node fails
    ///
    /// A node fails in a round when the share of its baseline peers it can
    /// still reach falls below the configured threshold. Every round is
    /// decided against the active set at the start of that round.
    pub fn simulate_cascade<K: NodeKey>(
        &self,
        graph: &mut Graph<K>,
        initial_failures: &[K],
    ) -> Result<Vec<CascadeRound<K>>> {
        let indices = Self::resolve(graph, initial_failures)?;
        tracing::info!(
            "Simulating cascade from {} initial failure(s), threshold {}",
            indices.len(),
            self.config.cascade_threshold
        );

        let baseline = Baseline::capture(graph);
        let mut guard = ScopedDisable::new(graph);
        for &index in &indices {
            guard.disable_node(index);
        }
        let rounds = self.run_cascade(&mut guard, &baseline);
        drop(guard);

        tracing::info!("Cascade settled after {} round(s)", rounds.len());
        Ok(rounds)
    }

    /// Failure report for every active node, most damaging first
    pub fn critical_nodes<K: NodeKey>(
        &self,
        graph: &mut Graph<K>,
    ) -> Result<Vec<FailureReport<K>>> {
        let candidates: Vec<K> = graph.active_nodes().into_iter().cloned().collect();
        let mut reports = candidates
            .iter()
            .map(|node| self.simulate_node_failure(graph, node))
            .collect::<Result<Vec<_>>>()?;

        reports.sort_by(|a, b| {
            b.impact_percent
                .total_cmp(&a.impact_percent)
                .then_with(|| a.disabled_nodes.cmp(&b.disabled_nodes))
        });
        Ok(reports)
    }

    fn resolve<K: NodeKey>(graph: &Graph<K>, nodes: &[K]) -> Result<Vec<NodeIndex>> {
        nodes
            .iter()
            .map(|n| graph.node_index(n).ok_or_else(|| NetworkError::node_not_found(n)))
            .collect()
    }

    /// Compare reachability among survivors against the baseline
    fn measure<K: NodeKey>(&self, graph: &Graph<K>, baseline: &Baseline) -> FailureReport<K> {
        let survivors: Vec<NodeIndex> = graph
            .active_node_indices()
            .filter(|&n| baseline.labels[n].is_some())
            .collect();

        let before = component_sizes(&baseline.labels, |n| graph.is_active_at(n));
        let labels = Connectivity::component_labels(graph);
        let after = component_sizes(&labels, |_| true);

        let mut disconnected = Vec::new();
        let mut isolated = Vec::new();
        let mut lost_pairs = 0;
        let mut reachable_pairs = 0;

        for &node in &survivors {
            let peers_before = baseline.labels[node].map_or(0, |l| before[l] - 1);
            let peers_after = labels[node].map_or(0, |l| after[l] - 1);
            reachable_pairs += peers_before;
            if peers_after < peers_before {
                lost_pairs += peers_before - peers_after;
                disconnected.push(graph.key(node).clone());
                if peers_after == 0 {
                    isolated.push(graph.key(node).clone());
                }
            }
        }

        tracing::debug!(
            "{} of {} survivors disconnected, {} reachable pairs lost",
            disconnected.len(),
            survivors.len(),
            lost_pairs
        );

        FailureReport {
            disabled_nodes: Vec::new(),
            disabled_edges: Vec::new(),
            impact_percent: percent(disconnected.len(), survivors.len()),
            disconnected,
            isolated,
            lost_pairs,
            connectivity_loss_percent: percent(lost_pairs, reachable_pairs),
            cascade_rounds: Vec::new(),
        }
    }

    fn run_cascade<K: NodeKey>(
        &self,
        guard: &mut ScopedDisable<'_, K>,
        baseline: &Baseline,
    ) -> Vec<CascadeRound<K>> {
        let threshold = self.config.cascade_threshold;
        let mut rounds = Vec::new();

        loop {
            let labels = Connectivity::component_labels(&**guard);
            let sizes = component_sizes(&labels, |_| true);

            let failing: Vec<NodeIndex> = guard
                .active_node_indices()
                .filter(|&node| {
                    let peers_before = baseline.peers(node);
                    if peers_before == 0 {
                        return false;
                    }
                    let peers_now = labels[node].map_or(0, |l| sizes[l] - 1);
                    (peers_now as f64 / peers_before as f64) < threshold
                })
                .collect();

            if failing.is_empty() {
                break;
            }

            let newly_failed: Vec<K> = failing.iter().map(|&n| guard.key(n).clone()).collect();
            for node in failing {
                guard.disable_node(node);
            }

            let round = CascadeRound {
                round: rounds.len() + 1,
                newly_failed,
                active_remaining: guard.active_node_count(),
            };
            tracing::debug!(
                "Cascade round {}: {} failed, {} active",
                round.round,
                round.newly_failed.len(),
                round.active_remaining
            );
            rounds.push(round);
        }

        rounds
    }
}
