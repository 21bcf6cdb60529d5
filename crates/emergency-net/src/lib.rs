//! # Emergency Net - Communication Network Analysis Engine
//!
//! An in-process engine for planning and stress-testing a small communication
//! network. The network is a weighted, undirected graph whose nodes and edges can
//! be switched off and on again without ever being deleted; the command
//! hierarchy is a self-balancing binary search tree.
//!
//! ## Core Capabilities
//!
//! - **Graph Model**: Arena-backed graph with reversible node/edge disablement
//! - **Spanning Trees**: Kruskal over a union-find, with an explicit spanning flag
//! - **Routing**: Dense Dijkstra, fewest-hop BFS and K edge-disjoint paths
//! - **Resilience**: Non-destructive single failure and cascade simulation
//! - **Frequency Planning**: Welsh-Powell greedy coloring with validation
//! - **Command Hierarchy**: AVL tree with rotations and bulk rebalancing
//!
//! The graph and tree halves are independent of each other.

pub mod api;
pub mod config;
pub mod graph;
pub mod tree;

pub use api::{
    analyze_coloring, build_graph, color_graph, coloring_violations, compute_mst,
    k_disjoint_paths, rebalance_tree, shortest_path, simulate_cascade, simulate_node_failure,
    validate_coloring,
};
pub use config::{AnalysisConfig, ReliabilityConfig};
pub use graph::{
    coloring::{
        ColoringAnalysis, ColoringEngine, ColoringResult, ColoringStrategy, ColoringViolation,
    },
    connectivity::Connectivity,
    disjoint::DisjointPathFinder,
    failure::{CascadeRound, FailureAnalyzer, FailureReport},
    handle::NetworkHandle,
    metrics::GraphMetrics,
    model::{EdgePolicy, EdgeSpec, Graph, NodeKey, WeightedEdge},
    mst::{MstResult, SpanningTreeBuilder},
    paths::{PathAlgorithm, PathEngine, PathResult},
    union_find::DisjointSet,
};
pub use tree::{
    avl::{AvlTree, Rotation, RotationCase},
    bst::SearchTree,
    node::{BinaryTree, TreeNode},
    rebalance::{RebalanceResult, TreeBalanceReport},
};

/// Why an edge was refused by the graph
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidEdgeReason {
    SelfLoop,
    NegativeWeight(f64),
    NonFiniteWeight,
    MissingEndpoint(String),
    Duplicate,
}

impl std::fmt::Display for InvalidEdgeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfLoop => write!(f, "self-loops are not allowed"),
            Self::NegativeWeight(w) => write!(f, "negative weight {}", w),
            Self::NonFiniteWeight => write!(f, "weight must be finite"),
            Self::MissingEndpoint(node) => write!(f, "endpoint {} does not exist", node),
            Self::Duplicate => write!(f, "an edge already joins these nodes"),
        }
    }
}

/// Main error types for network analysis operations
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Invalid edge {from}-{to}: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: InvalidEdgeReason,
    },

    #[error("No path found from {from} to {to}")]
    NoPath { from: String, to: String },

    #[error("Graph has no active nodes: {0} needs at least one")]
    EmptyGraph(&'static str),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("No edge between {from} and {to}")]
    EdgeNotFound { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NetworkError {
    pub(crate) fn no_path<K: std::fmt::Display>(from: &K, to: &K) -> Self {
        Self::NoPath {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub(crate) fn node_not_found<K: std::fmt::Display>(node: &K) -> Self {
        Self::NodeNotFound(node.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Install a `tracing` subscriber for binaries and test harnesses embedding the engine
pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("emergency_net=debug".parse()?),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("Emergency Net v{} initialized", env!("CARGO_PKG_VERSION"));
    Ok(())
}
