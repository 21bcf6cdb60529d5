//! Graph model for the communication network
//!
//! Nodes live in an insertion-ordered arena keyed by the caller's identifiers and
//! are addressed internally by their arena position. Edges are stored once, as
//! index pairs into that arena, and the adjacency lists are derived from them.
//! Nothing is ever removed: failures are modelled by flipping `active` flags.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{InvalidEdgeReason, NetworkError, Result};

/// Identifier usable as a network node key
pub trait NodeKey: Clone + Eq + Hash + Ord + Debug + Display {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + Ord + Debug + Display {}

/// Position of a node in the arena
pub type NodeIndex = usize;

/// Position of an edge in the edge list
pub type EdgeIndex = usize;

/// Which active edges a traversal may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Every active edge is usable
    #[default]
    IncludeVulnerable,
    /// Edges marked vulnerable are skipped
    AvoidVulnerable,
}

impl EdgePolicy {
    fn admits(self, edge: &Edge) -> bool {
        match self {
            Self::IncludeVulnerable => true,
            Self::AvoidVulnerable => !edge.vulnerable,
        }
    }
}

/// A node in the network graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node<K> {
    pub id: K,
    pub active: bool,
}

/// An undirected edge between two arena positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub weight: f64,
    pub vulnerable: bool,
    pub active: bool,
}

impl Edge {
    /// The endpoint opposite `node`
    pub fn other(&self, node: NodeIndex) -> NodeIndex {
        if self.from == node {
            self.to
        } else {
            self.from
        }
    }
}

/// An edge described by its endpoint keys, as handed to and returned from callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedEdge<K> {
    pub from: K,
    pub to: K,
    pub weight: f64,
    pub vulnerable: bool,
}

/// Description of an edge to add
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec<K> {
    pub from: K,
    pub to: K,
    pub weight: f64,
    pub vulnerable: bool,
}

impl<K> EdgeSpec<K> {
    pub fn new(from: K, to: K, weight: f64) -> Self {
        Self {
            from,
            to,
            weight,
            vulnerable: false,
        }
    }

    pub fn vulnerable(mut self) -> Self {
        self.vulnerable = true;
        self
    }
}

impl<K> From<(K, K, f64)> for EdgeSpec<K> {
    fn from((from, to, weight): (K, K, f64)) -> Self {
        Self::new(from, to, weight)
    }
}

/// The network graph structure
#[derive(Debug, Clone)]
pub struct Graph<K: NodeKey> {
    nodes: IndexMap<K, Node<K>>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<EdgeIndex>>,
    pairs: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
}

impl<K: NodeKey> Default for Graph<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_key(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl<K: NodeKey> Graph<K> {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            adjacency: Vec::new(),
            pairs: HashMap::new(),
        }
    }

    /// Build a graph from a node list and an edge list
    pub fn build<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = K>,
        E: IntoIterator<Item = EdgeSpec<K>>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        for edge in edges {
            graph.add_edge_spec(edge)?;
        }
        Ok(graph)
    }

    /// Build a graph from `(from, to, weight)` triples
    pub fn from_edges<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = K>,
        E: IntoIterator<Item = (K, K, f64)>,
    {
        Self::build(nodes, edges.into_iter().map(EdgeSpec::from))
    }

    /// Add a node; adding an existing key returns its current index
    pub fn add_node(&mut self, id: K) -> NodeIndex {
        if let Some(index) = self.nodes.get_index_of(&id) {
            return index;
        }
        let (index, _) = self.nodes.insert_full(id.clone(), Node { id, active: true });
        self.adjacency.push(Vec::new());
        index
    }

    /// Add an edge between two existing nodes
    pub fn add_edge(&mut self, from: &K, to: &K, weight: f64) -> Result<EdgeIndex> {
        self.add_edge_spec(EdgeSpec::new(from.clone(), to.clone(), weight))
    }

    /// Add an edge described by an [`EdgeSpec`]
    pub fn add_edge_spec(&mut self, spec: EdgeSpec<K>) -> Result<EdgeIndex> {
        let reject = |reason| NetworkError::InvalidEdge {
            from: spec.from.to_string(),
            to: spec.to.to_string(),
            reason,
        };

        let from = self
            .node_index(&spec.from)
            .ok_or_else(|| reject(InvalidEdgeReason::MissingEndpoint(spec.from.to_string())))?;
        let to = self
            .node_index(&spec.to)
            .ok_or_else(|| reject(InvalidEdgeReason::MissingEndpoint(spec.to.to_string())))?;

        if from == to {
            return Err(reject(InvalidEdgeReason::SelfLoop));
        }
        if !spec.weight.is_finite() {
            return Err(reject(InvalidEdgeReason::NonFiniteWeight));
        }
        if spec.weight < 0.0 {
            return Err(reject(InvalidEdgeReason::NegativeWeight(spec.weight)));
        }
        if self.pairs.contains_key(&pair_key(from, to)) {
            return Err(reject(InvalidEdgeReason::Duplicate));
        }

        let index = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            weight: spec.weight,
            vulnerable: spec.vulnerable,
            active: true,
        });
        self.adjacency[from].push(index);
        self.adjacency[to].push(index);
        self.pairs.insert(pair_key(from, to), index);
        Ok(index)
    }

    /// Switch a node on or off, returning its previous state
    pub fn set_active(&mut self, node: &K, active: bool) -> Result<bool> {
        let index = self
            .node_index(node)
            .ok_or_else(|| NetworkError::node_not_found(node))?;
        Ok(self.set_active_at(index, active))
    }

    pub(crate) fn set_active_at(&mut self, index: NodeIndex, active: bool) -> bool {
        let node = &mut self.nodes[index];
        std::mem::replace(&mut node.active, active)
    }

    /// Switch an edge on or off, returning its previous state
    pub fn set_edge_active(&mut self, from: &K, to: &K, active: bool) -> Result<bool> {
        let index = self.require_edge(from, to)?;
        Ok(self.set_edge_active_at(index, active))
    }

    pub(crate) fn set_edge_active_at(&mut self, index: EdgeIndex, active: bool) -> bool {
        std::mem::replace(&mut self.edges[index].active, active)
    }

    /// Mark or unmark an edge as vulnerable, returning the previous marking
    pub fn mark_vulnerable(&mut self, from: &K, to: &K, vulnerable: bool) -> Result<bool> {
        let index = self.require_edge(from, to)?;
        Ok(std::mem::replace(&mut self.edges[index].vulnerable, vulnerable))
    }

    fn require_edge(&self, from: &K, to: &K) -> Result<EdgeIndex> {
        self.edge_index_between(from, to)
            .ok_or_else(|| NetworkError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    pub fn contains(&self, node: &K) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node_index(&self, node: &K) -> Option<NodeIndex> {
        self.nodes.get_index_of(node)
    }

    /// Key of the node at `index`
    pub fn key(&self, index: NodeIndex) -> &K {
        &self.nodes[index].id
    }

    pub fn node(&self, index: NodeIndex) -> &Node<K> {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<K>> + '_ {
        self.nodes.values()
    }

    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.edges[index]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Whether the node exists and is active
    pub fn is_active(&self, node: &K) -> bool {
        self.nodes.get(node).is_some_and(|n| n.active)
    }

    pub fn is_active_at(&self, index: NodeIndex) -> bool {
        self.nodes[index].active
    }

    /// An edge is usable when it and both of its endpoints are active
    pub fn is_edge_usable(&self, index: EdgeIndex) -> bool {
        let edge = &self.edges[index];
        edge.active && self.nodes[edge.from].active && self.nodes[edge.to].active
    }

    /// Active neighbors of the node at `index` with the connecting edge
    pub fn active_adjacent(
        &self,
        index: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        self.traversable_adjacent(index, EdgePolicy::IncludeVulnerable)
    }

    /// Active neighbors reachable under `policy`, in edge insertion order
    pub fn traversable_adjacent(
        &self,
        index: NodeIndex,
        policy: EdgePolicy,
    ) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        let edges: &[EdgeIndex] = if self.nodes[index].active {
            self.adjacency[index].as_slice()
        } else {
            &[]
        };
        edges.iter().filter_map(move |&e| {
            let edge = &self.edges[e];
            (self.is_edge_usable(e) && policy.admits(edge)).then(|| (edge.other(index), e))
        })
    }

    /// Neighbors of `node` over active edges between active endpoints
    pub fn active_neighbors(&self, node: &K) -> Vec<(&K, f64)> {
        self.traversable_neighbors(node, EdgePolicy::IncludeVulnerable)
    }

    pub fn traversable_neighbors(&self, node: &K, policy: EdgePolicy) -> Vec<(&K, f64)> {
        let Some(index) = self.node_index(node) else {
            return Vec::new();
        };
        self.traversable_adjacent(index, policy)
            .map(|(n, e)| (self.key(n), self.edges[e].weight))
            .collect()
    }

    /// Degree of a node over the active subgraph
    pub fn active_degree(&self, index: NodeIndex) -> usize {
        self.active_adjacent(index).count()
    }

    pub fn active_node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes
            .values()
            .enumerate()
            .filter(|(_, n)| n.active)
            .map(|(i, _)| i)
    }

    pub fn active_nodes(&self) -> Vec<&K> {
        self.nodes.values().filter(|n| n.active).map(|n| &n.id).collect()
    }

    pub fn active_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.active).count()
    }

    pub fn active_edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        (0..self.edges.len()).filter(|&e| self.is_edge_usable(e))
    }

    pub(crate) fn weighted_edge(&self, index: EdgeIndex) -> WeightedEdge<K> {
        let edge = &self.edges[index];
        WeightedEdge {
            from: self.key(edge.from).clone(),
            to: self.key(edge.to).clone(),
            weight: edge.weight,
            vulnerable: edge.vulnerable,
        }
    }

    /// Every edge exactly once, in insertion order
    pub fn all_edges(&self) -> Vec<WeightedEdge<K>> {
        (0..self.edges.len()).map(|e| self.weighted_edge(e)).collect()
    }

    /// Edges of the active subgraph, in insertion order
    pub fn active_edges(&self) -> Vec<WeightedEdge<K>> {
        self.active_edge_indices()
            .map(|e| self.weighted_edge(e))
            .collect()
    }

    pub fn edge_index_between(&self, from: &K, to: &K) -> Option<EdgeIndex> {
        let a = self.node_index(from)?;
        let b = self.node_index(to)?;
        self.pairs.get(&pair_key(a, b)).copied()
    }

    pub(crate) fn edge_index_at(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.pairs.get(&pair_key(a, b)).copied()
    }

    pub fn edge_between(&self, from: &K, to: &K) -> Option<&Edge> {
        self.edge_index_between(from, to).map(|e| &self.edges[e])
    }

    pub fn is_vulnerable(&self, from: &K, to: &K) -> bool {
        self.edge_between(from, to).is_some_and(|e| e.vulnerable)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
