//! Graph module - Network model and the algorithms that run over it

pub mod model;
pub mod union_find;
pub mod mst;
pub mod connectivity;
pub mod paths;
pub mod disjoint;
pub mod failure;
pub mod coloring;
pub mod metrics;
pub mod handle;

pub use model::{Edge, EdgePolicy, EdgeSpec, Graph, Node, NodeKey, WeightedEdge};
pub use mst::{MstResult, SpanningTreeBuilder};
pub use paths::{path_reliability, PathAlgorithm, PathEngine, PathResult};
pub use disjoint::DisjointPathFinder;
pub use failure::{CascadeRound, FailureAnalyzer, FailureReport};
pub use coloring::{ColoringEngine, ColoringResult, ColoringStrategy, ColoringViolation};
pub use metrics::{GraphMetrics, NetworkSummary};
pub use handle::NetworkHandle;
