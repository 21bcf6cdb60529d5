//! AVL Tree - Self-balancing command hierarchy
//!
//! Every insert and delete rebuilds the path it touched bottom-up: each node
//! gets its height recomputed and, when its balance factor leaves [-1, 1], is
//! replaced by the root of the rotated subtree. Rotations return the new root
//! to their caller; no parent pointers are involved.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{insert_with, remove_with, BinaryTree, Link, TreeNode};

/// Which of the four imbalance shapes a rotation repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationCase {
    /// Left child left-heavy: single right rotation
    #[serde(rename = "LL")]
    LeftLeft,
    /// Right child right-heavy: single left rotation
    #[serde(rename = "RR")]
    RightRight,
    /// Left child right-heavy: left rotation on the child, then right rotation
    #[serde(rename = "LR")]
    LeftRight,
    /// Right child left-heavy: right rotation on the child, then left rotation
    #[serde(rename = "RL")]
    RightLeft,
}

impl fmt::Display for RotationCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LeftLeft => "LL",
            Self::RightRight => "RR",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        };
        f.write_str(label)
    }
}

/// A rebalancing step, keyed by the node that was out of balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation<K> {
    pub case: RotationCase,
    pub pivot: K,
}

#[derive(Debug, Clone)]
pub struct AvlTree<K> {
    root: Link<K>,
    len: usize,
    last_rotations: Vec<Rotation<K>>,
}

impl<K: Ord + Clone + fmt::Debug> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + fmt::Debug> AvlTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            last_rotations: Vec::new(),
        }
    }

    /// Build a minimum-height tree by recursive midpoint selection
    ///
    /// Keys are sorted and deduplicated first; already sorted input is
    /// handled in linear time.
    pub fn from_sorted(mut keys: Vec<K>) -> Self {
        keys.sort();
        keys.dedup();
        let len = keys.len();
        let root = build_balanced(&mut keys.into_iter(), len);
        Self {
            root,
            len,
            last_rotations: Vec::new(),
        }
    }

    /// Insert `key`; returns `false` if it was already present
    pub fn insert(&mut self, key: K) -> bool {
        let mut rotations = Vec::new();
        let (root, inserted) = insert_with(self.root.take(), key, &mut |node| {
            rebalance(node, &mut rotations)
        });
        self.root = Some(root);
        self.last_rotations = rotations;
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Delete `key`; returns `false` if it was not present
    ///
    /// Unlike insertion, a deletion may rotate at several ancestors.
    pub fn delete(&mut self, key: &K) -> bool {
        let mut rotations = Vec::new();
        let (root, removed) = remove_with(self.root.take(), key, &mut |node| {
            rebalance(node, &mut rotations)
        });
        self.root = root;
        self.last_rotations = rotations;
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Rotations performed by the most recent insert or delete, bottom-up
    pub fn last_rotations(&self) -> &[Rotation<K>] {
        &self.last_rotations
    }
}

impl<K: Ord> BinaryTree<K> for AvlTree<K> {
    fn root(&self) -> Option<&TreeNode<K>> {
        self.root.as_deref()
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Ord + Clone + fmt::Debug> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        for key in iter {
            tree.insert(key);
        }
        tree
    }
}

fn build_balanced<K>(keys: &mut impl Iterator<Item = K>, len: usize) -> Link<K> {
    if len == 0 {
        return None;
    }
    let left_len = (len - 1) / 2;
    let left = build_balanced(keys, left_len);
    let key = keys.next()?;
    let right = build_balanced(keys, len - left_len - 1);

    let mut node = Box::new(TreeNode {
        key,
        left,
        right,
        height: 1,
    });
    node.update_height();
    Some(node)
}

fn rotate_right<K>(mut node: Box<TreeNode<K>>) -> Box<TreeNode<K>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left<K>(mut node: Box<TreeNode<K>>) -> Box<TreeNode<K>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Restore the AVL property at `node`, assuming both subtrees already hold it
fn rebalance<K: Clone + fmt::Debug>(
    mut node: Box<TreeNode<K>>,
    log: &mut Vec<Rotation<K>>,
) -> Box<TreeNode<K>> {
    let balance = node.balance_factor();

    if balance > 1 {
        let case = match node.left.take() {
            Some(left) if left.balance_factor() < 0 => {
                node.left = Some(rotate_left(left));
                RotationCase::LeftRight
            }
            left => {
                node.left = left;
                RotationCase::LeftLeft
            }
        };
        tracing::trace!("{} rotation at {:?}", case, node.key);
        log.push(Rotation {
            case,
            pivot: node.key.clone(),
        });
        return rotate_right(node);
    }

    if balance < -1 {
        let case = match node.right.take() {
            Some(right) if right.balance_factor() > 0 => {
                node.right = Some(rotate_right(right));
                RotationCase::RightLeft
            }
            right => {
                node.right = right;
                RotationCase::RightRight
            }
        };
        tracing::trace!("{} rotation at {:?}", case, node.key);
        log.push(Rotation {
            case,
            pivot: node.key.clone(),
        });
        return rotate_left(node);
    }

    node
}
