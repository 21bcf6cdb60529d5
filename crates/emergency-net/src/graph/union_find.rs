//! Union-find (disjoint set union) used as the cycle detector of the spanning tree builder

use std::collections::HashMap;
use std::hash::Hash;

/// Disjoint sets with path compression and union by rank
///
/// Elements must be registered with [`DisjointSet::make_set`] before they are
/// queried; looking up an unregistered element panics.
#[derive(Debug, Clone)]
pub struct DisjointSet<T> {
    parent: HashMap<T, T>,
    rank: HashMap<T, u8>,
}

impl<T: Copy + Eq + Hash> Default for DisjointSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq + Hash> DisjointSet<T> {
    pub fn new() -> Self {
        Self {
            parent: HashMap::new(),
            rank: HashMap::new(),
        }
    }

    /// Create a singleton set; re-registering an element leaves it untouched
    pub fn make_set(&mut self, x: T) {
        self.parent.entry(x).or_insert(x);
        self.rank.entry(x).or_insert(0);
    }

    pub fn contains(&self, x: T) -> bool {
        self.parent.contains_key(&x)
    }

    /// Canonical representative of the set holding `x`
    pub fn find(&mut self, x: T) -> T {
        let mut root = x;
        while self.parent[&root] != root {
            root = self.parent[&root];
        }

        let mut node = x;
        while node != root {
            let next = self.parent[&node];
            self.parent.insert(node, root);
            node = next;
        }

        root
    }

    /// Merge the sets holding `x` and `y`; `false` means they were already joined
    pub fn union(&mut self, x: T, y: T) -> bool {
        let mut left = self.find(x);
        let mut right = self.find(y);
        if left == right {
            return false;
        }

        let left_rank = self.rank[&left];
        let right_rank = self.rank[&right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent.insert(right, left);
        if left_rank == right_rank {
            self.rank.insert(left, left_rank.saturating_add(1));
        }
        true
    }

    /// Whether `x` and `y` share a set
    pub fn connected(&mut self, x: T, y: T) -> bool {
        self.find(x) == self.find(y)
    }

    /// Number of disjoint sets currently tracked
    pub fn set_count(&self) -> usize {
        self.parent.iter().filter(|(k, v)| k == v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_reports_merges() {
        let mut sets = DisjointSet::new();
        for x in 0..5 {
            sets.make_set(x);
        }
        assert_eq!(sets.set_count(), 5);

        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(sets.union(1, 3));
        assert!(!sets.union(0, 2));

        assert!(sets.connected(0, 3));
        assert!(!sets.connected(0, 4));
        assert_eq!(sets.set_count(), 2);
    }

    #[test]
    fn test_find_compresses_paths() {
        let mut sets = DisjointSet::new();
        for x in 0..8 {
            sets.make_set(x);
        }
        for x in 1..8 {
            sets.union(x - 1, x);
        }
        let root = sets.find(7);
        for x in 0..8 {
            assert_eq!(sets.find(x), root);
            assert_eq!(sets.parent[&x], root);
        }
    }

    #[test]
    fn test_make_set_is_idempotent() {
        let mut sets = DisjointSet::new();
        sets.make_set('a');
        sets.make_set('b');
        sets.union('a', 'b');
        sets.make_set('b');
        assert!(sets.connected('a', 'b'));
        assert!(sets.contains('a'));
        assert!(!sets.contains('z'));
    }
}
