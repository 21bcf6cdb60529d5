//! Tree nodes, the read-only tree interface and lazy traversals

use std::collections::VecDeque;

use serde::Serialize;

/// An owned, possibly empty subtree
pub type Link<K> = Option<Box<TreeNode<K>>>;

/// A node that exclusively owns both of its subtrees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<K> {
    pub key: K,
    pub left: Link<K>,
    pub right: Link<K>,
    /// Nodes on the longest downward path, this one included; a leaf has height 1
    pub height: usize,
}

impl<K> TreeNode<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
            height: 1,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// height(left) - height(right)
    pub fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    pub(crate) fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }
}

pub(crate) fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

/// Insert `key` below `link`, handing every node on the way back up to `fix`
///
/// Returns the new subtree root and whether the key was added.
pub(crate) fn insert_with<K: Ord, F>(link: Link<K>, key: K, fix: &mut F) -> (Box<TreeNode<K>>, bool)
where
    F: FnMut(Box<TreeNode<K>>) -> Box<TreeNode<K>>,
{
    let Some(mut node) = link else {
        return (Box::new(TreeNode::new(key)), true);
    };

    let inserted = match key.cmp(&node.key) {
        std::cmp::Ordering::Less => {
            let (child, inserted) = insert_with(node.left.take(), key, fix);
            node.left = Some(child);
            inserted
        }
        std::cmp::Ordering::Greater => {
            let (child, inserted) = insert_with(node.right.take(), key, fix);
            node.right = Some(child);
            inserted
        }
        std::cmp::Ordering::Equal => return (node, false),
    };

    node.update_height();
    (fix(node), inserted)
}

/// Remove `key` from below `link`, handing every node on the way back up to `fix`
pub(crate) fn remove_with<K: Ord, F>(link: Link<K>, key: &K, fix: &mut F) -> (Link<K>, bool)
where
    F: FnMut(Box<TreeNode<K>>) -> Box<TreeNode<K>>,
{
    let Some(mut node) = link else {
        return (None, false);
    };

    let removed = match key.cmp(&node.key) {
        std::cmp::Ordering::Less => {
            let (child, removed) = remove_with(node.left.take(), key, fix);
            node.left = child;
            removed
        }
        std::cmp::Ordering::Greater => {
            let (child, removed) = remove_with(node.right.take(), key, fix);
            node.right = child;
            removed
        }
        std::cmp::Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => return (None, true),
            (Some(child), None) | (None, Some(child)) => return (Some(child), true),
            (Some(left), Some(right)) => {
                // Replace with the in-order successor
                let (successor, rest) = take_min(right, fix);
                node.key = successor;
                node.left = Some(left);
                node.right = rest;
                true
            }
        },
    };

    if !removed {
        return (Some(node), false);
    }
    node.update_height();
    (Some(fix(node)), true)
}

fn take_min<K, F>(mut node: Box<TreeNode<K>>, fix: &mut F) -> (K, Link<K>)
where
    F: FnMut(Box<TreeNode<K>>) -> Box<TreeNode<K>>,
{
    match node.left.take() {
        None => (node.key, node.right),
        Some(left) => {
            let (min, rest) = take_min(left, fix);
            node.left = rest;
            node.update_height();
            (min, Some(fix(node)))
        }
    }
}

/// Read-only operations shared by every binary search tree in the crate
pub trait BinaryTree<K: Ord> {
    fn root(&self) -> Option<&TreeNode<K>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present; a miss is `false`, never an error
    fn search(&self, key: &K) -> bool {
        let mut current = self.root();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left.as_deref(),
                std::cmp::Ordering::Greater => node.right.as_deref(),
                std::cmp::Ordering::Equal => return true,
            };
        }
        false
    }

    /// Height of the whole tree; 0 when empty
    fn height(&self) -> usize {
        self.root().map_or(0, |n| n.height)
    }

    /// Whether every node satisfies |balance factor| <= 1
    fn is_balanced(&self) -> bool {
        Nodes::new(self.root()).all(|n| n.balance_factor().abs() <= 1)
    }

    fn in_order(&self) -> InOrder<'_, K> {
        InOrder::new(self.root())
    }

    fn pre_order(&self) -> PreOrder<'_, K> {
        PreOrder(Nodes::new(self.root()))
    }

    fn post_order(&self) -> PostOrder<'_, K> {
        PostOrder {
            stack: self.root().map(|r| (r, false)).into_iter().collect(),
        }
    }

    fn level_order(&self) -> LevelOrder<'_, K> {
        LevelOrder {
            queue: self.root().into_iter().collect(),
        }
    }

    /// Every key with its depth (root at 0), in pre-order
    fn nodes_with_level(&self) -> Vec<(&K, usize)> {
        let mut result = Vec::with_capacity(self.len());
        let mut stack: Vec<(&TreeNode<K>, usize)> =
            self.root().map(|r| (r, 0)).into_iter().collect();
        while let Some((node, level)) = stack.pop() {
            result.push((&node.key, level));
            if let Some(right) = node.right.as_deref() {
                stack.push((right, level + 1));
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, level + 1));
            }
        }
        result
    }
}

/// Pre-order walk over nodes
#[derive(Debug, Clone)]
pub(crate) struct Nodes<'a, K> {
    stack: Vec<&'a TreeNode<K>>,
}

impl<'a, K> Nodes<'a, K> {
    pub(crate) fn new(root: Option<&'a TreeNode<K>>) -> Self {
        Self {
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a, K> Iterator for Nodes<'a, K> {
    type Item = &'a TreeNode<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(node)
    }
}

/// Keys in ascending order
#[derive(Debug, Clone)]
pub struct InOrder<'a, K> {
    stack: Vec<&'a TreeNode<K>>,
}

impl<'a, K> InOrder<'a, K> {
    fn new(root: Option<&'a TreeNode<K>>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a TreeNode<K>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.key)
    }
}

/// Keys root first, then the left subtree, then the right
#[derive(Debug, Clone)]
pub struct PreOrder<'a, K>(Nodes<'a, K>);

impl<'a, K> Iterator for PreOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|n| &n.key)
    }
}

/// Keys with both subtrees before their root
#[derive(Debug, Clone)]
pub struct PostOrder<'a, K> {
    /// Nodes paired with whether their children were already scheduled
    stack: Vec<(&'a TreeNode<K>, bool)>,
}

impl<'a, K> Iterator for PostOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, expanded)) = self.stack.pop() {
            if expanded {
                return Some(&node.key);
            }
            self.stack.push((node, true));
            if let Some(right) = node.right.as_deref() {
                self.stack.push((right, false));
            }
            if let Some(left) = node.left.as_deref() {
                self.stack.push((left, false));
            }
        }
        None
    }
}

/// Keys breadth-first, level by level
#[derive(Debug, Clone)]
pub struct LevelOrder<'a, K> {
    queue: VecDeque<&'a TreeNode<K>>,
}

impl<'a, K> Iterator for LevelOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.left.as_deref());
        self.queue.extend(node.right.as_deref());
        Some(&node.key)
    }
}
