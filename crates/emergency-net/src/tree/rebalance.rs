//! Bulk rebalancing and balance metrics for existing hierarchies

use std::fmt;

use serde::{Deserialize, Serialize};

use super::avl::AvlTree;
use super::node::BinaryTree;

/// Outcome of rebuilding a tree at minimum height
#[derive(Debug, Clone)]
pub struct RebalanceResult<K> {
    pub tree: AvlTree<K>,
    pub height_before: usize,
    pub height_after: usize,
}

/// Depth statistics over the leaves of a tree, root at depth 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafDepthStats {
    pub min: usize,
    pub max: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeBalanceReport {
    pub is_balanced: bool,
    pub height: usize,
    pub size: usize,
    pub optimal_height: usize,
    /// Levels above the minimum possible height
    pub height_overhead: usize,
    pub imbalance_ratio: f64,
    pub leaf_depths: LeafDepthStats,
}

/// Rebuild any binary search tree as a minimum-height AVL tree
///
/// Keys are read in order and the new tree is assembled by midpoint
/// selection, which is linear in the number of keys.
pub fn rebalance_tree<K, T>(tree: &T) -> RebalanceResult<K>
where
    K: Ord + Clone + fmt::Debug,
    T: BinaryTree<K> + ?Sized,
{
    let height_before = tree.height();
    let rebuilt = AvlTree::from_sorted(tree.in_order().cloned().collect());
    let height_after = rebuilt.height();

    tracing::debug!(
        "Rebalanced {} keys: height {} -> {}",
        rebuilt.len(),
        height_before,
        height_after
    );

    RebalanceResult {
        tree: rebuilt,
        height_before,
        height_after,
    }
}

/// Smallest possible height of a binary tree with `n` nodes
pub fn optimal_height(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize
}

/// Deepest leaf level over shallowest leaf level, both counted from 1
///
/// 1.0 means every leaf sits at the same depth; an empty tree also reports 1.0.
pub fn imbalance_ratio<K: Ord, T: BinaryTree<K> + ?Sized>(tree: &T) -> f64 {
    if tree.is_empty() {
        return 1.0;
    }
    let stats = leaf_depth_stats(tree);
    (stats.max + 1) as f64 / (stats.min + 1) as f64
}

pub fn leaf_depth_stats<K: Ord, T: BinaryTree<K> + ?Sized>(tree: &T) -> LeafDepthStats {
    let mut depths = Vec::new();
    let mut stack: Vec<_> = tree.root().map(|r| (r, 0usize)).into_iter().collect();
    while let Some((node, depth)) = stack.pop() {
        if node.is_leaf() {
            depths.push(depth);
        }
        stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
        stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
    }

    if depths.is_empty() {
        return LeafDepthStats {
            min: 0,
            max: 0,
            average: 0.0,
        };
    }
    LeafDepthStats {
        min: depths.iter().copied().min().unwrap_or(0),
        max: depths.iter().copied().max().unwrap_or(0),
        average: depths.iter().sum::<usize>() as f64 / depths.len() as f64,
    }
}

pub fn analyze_tree_balance<K: Ord, T: BinaryTree<K> + ?Sized>(tree: &T) -> TreeBalanceReport {
    let height = tree.height();
    let optimal = optimal_height(tree.len());

    TreeBalanceReport {
        is_balanced: tree.is_balanced(),
        height,
        size: tree.len(),
        optimal_height: optimal,
        height_overhead: height.saturating_sub(optimal),
        imbalance_ratio: imbalance_ratio(tree),
        leaf_depths: leaf_depth_stats(tree),
    }
}
