//! Plain binary search tree
//!
//! Keeps whatever shape its insertion order produces, so sorted input
//! degenerates into a list. This is the kind of hierarchy that bulk
//! rebalancing is meant to repair.

use super::node::{insert_with, remove_with, BinaryTree, Link, TreeNode};

#[derive(Debug, Clone)]
pub struct SearchTree<K> {
    root: Link<K>,
    len: usize,
}

impl<K: Ord> Default for SearchTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> SearchTree<K> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Insert `key`; returns `false` if it was already present
    pub fn insert(&mut self, key: K) -> bool {
        let (root, inserted) = insert_with(self.root.take(), key, &mut |node| node);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Delete `key`; returns `false` if it was not present
    pub fn delete(&mut self, key: &K) -> bool {
        let (root, removed) = remove_with(self.root.take(), key, &mut |node| node);
        self.root = root;
        if removed {
            self.len -= 1;
        }
        removed
    }
}

impl<K: Ord> BinaryTree<K> for SearchTree<K> {
    fn root(&self) -> Option<&TreeNode<K>> {
        self.root.as_deref()
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Ord> FromIterator<K> for SearchTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        for key in iter {
            tree.insert(key);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> SearchTree<i32> {
        [50, 30, 70, 20, 40, 60, 80].into_iter().collect()
    }

    #[test]
    fn test_traversals() {
        let tree = create_test_tree();
        let in_order: Vec<_> = tree.in_order().copied().collect();
        let pre_order: Vec<_> = tree.pre_order().copied().collect();
        let post_order: Vec<_> = tree.post_order().copied().collect();
        let level_order: Vec<_> = tree.level_order().copied().collect();

        assert_eq!(in_order, vec![20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(pre_order, vec![50, 30, 20, 40, 70, 60, 80]);
        assert_eq!(post_order, vec![20, 40, 30, 60, 80, 70, 50]);
        assert_eq!(level_order, vec![50, 30, 70, 20, 40, 60, 80]);
    }

    #[test]
    fn test_traversals_are_restartable() {
        let tree = create_test_tree();
        let mut walk = tree.in_order();
        assert_eq!(walk.next(), Some(&20));
        let fork = walk.clone();
        assert_eq!(walk.count(), 6);
        assert_eq!(fork.count(), 6);
        assert_eq!(tree.in_order().count(), 7);
    }

    #[test]
    fn test_insert_search_delete() {
        let mut tree = create_test_tree();
        assert!(!tree.insert(40));
        assert_eq!(tree.len(), 7);
        assert!(tree.search(&60));
        assert!(!tree.search(&65));

        // Two children: replaced by the in-order successor
        assert!(tree.delete(&30));
        assert!(!tree.search(&30));
        assert_eq!(tree.pre_order().copied().collect::<Vec<_>>(), vec![50, 40, 20, 70, 60, 80]);

        assert!(tree.delete(&50));
        assert!(!tree.delete(&50));
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), vec![20, 40, 60, 70, 80]);
        assert_eq!(tree.root().map(|n| n.key), Some(60));
    }

    #[test]
    fn test_sorted_input_degenerates() {
        let tree: SearchTree<i32> = (1..=6).collect();
        assert_eq!(tree.height(), 6);
        assert!(!tree.is_balanced());

        let levels = tree.nodes_with_level();
        assert_eq!(levels[5], (&6, 5));
    }

    #[test]
    fn test_empty_tree() {
        let mut tree: SearchTree<i32> = SearchTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.is_balanced());
        assert!(!tree.delete(&1));
        assert_eq!(tree.in_order().next(), None);
        assert_eq!(tree.post_order().next(), None);
    }
}
