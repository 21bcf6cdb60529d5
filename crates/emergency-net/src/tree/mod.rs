//! Tree module - Command hierarchy as a binary search tree

pub mod node;
pub mod bst;
pub mod avl;
pub mod rebalance;

pub use node::{BinaryTree, InOrder, LevelOrder, Link, PostOrder, PreOrder, TreeNode};
pub use bst::SearchTree;
pub use avl::{AvlTree, Rotation, RotationCase};
pub use rebalance::{
    analyze_tree_balance, imbalance_ratio, leaf_depth_stats, optimal_height, rebalance_tree,
    LeafDepthStats, RebalanceResult, TreeBalanceReport,
};
