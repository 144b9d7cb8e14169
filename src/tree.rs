use std::{borrow::Borrow, cmp::Ordering::*, fmt::Debug};

use log::debug;

use crate::{Arena, Color, Iter, Node, NodeId, Position, RankTree, Side};

impl<K> Default for RankTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RankTree<K> {
    pub const fn new() -> Self {
        RankTree {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// An empty tree with room for `capacity` keys before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        RankTree {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of distinct keys stored, read off the root's subtree size.
    pub fn len(&self) -> usize {
        self.size_of(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every node at once.
    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn get(&self, id: NodeId) -> &Node<K> {
        self.node(id)
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn key(&self, id: NodeId) -> &K {
        &self.node(id).key
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn color(&self, id: NodeId) -> Color {
        self.node(id).color
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.node(id).size
    }

    /// The key at a bound-search result, `None` for [`Position::End`].
    pub fn key_at(&self, position: Position) -> Option<&K> {
        position.node().map(|id| self.key(id))
    }

    pub fn first(&self) -> Option<&K> {
        self.first_node().map(|id| self.key(id))
    }

    pub fn last(&self) -> Option<&K> {
        self.last_node().map(|id| self.key(id))
    }

    pub fn first_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    fn extreme(&self, mut id: NodeId, side: Side) -> NodeId {
        while let Some(child) = self.node(id).child(side) {
            id = child;
        }
        id
    }

    /// The node holding the next larger key.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        self.step(id, Side::Right)
    }

    /// The node holding the next smaller key.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.step(id, Side::Left)
    }

    fn step(&self, id: NodeId, side: Side) -> Option<NodeId> {
        // With a child towards `side`, go down once then as far as possible
        // the other way.
        if let Some(child) = self.node(id).child(side) {
            return Some(self.extreme(child, side.opposite()));
        }
        // Otherwise climb while we are the `side` child; the first ancestor
        // reached from the other side is the answer.
        let mut node = id;
        while let Some(parent) = self.node(node).parent {
            if self.node(parent).child(side) != Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }

    /// Number of stored keys strictly less than the key at `position`.
    /// [`Position::End`] and the empty tree both rank at 0.
    pub fn rank(&self, position: Position) -> usize {
        let Position::At(id) = position else {
            return 0;
        };
        if self.is_empty() {
            return 0;
        }

        let mut rank = self.size_of(self.node(id).left);
        let mut node = id;
        while let Some(parent) = self.node(node).parent {
            if self.node(parent).right == Some(node) {
                rank += 1 + self.size_of(self.node(parent).left);
            }
            node = parent;
        }
        rank
    }

    /// Number of keys in the half-open span `[first, last)`.
    ///
    /// Passing `lower_bound(lo)` and `upper_bound(hi)` counts the keys in
    /// `[lo, hi]`. A `last` that precedes `first` yields 0.
    pub fn distance(&self, first: Position, last: Position) -> usize {
        if first.is_end() || self.is_empty() || first == last {
            return 0;
        }
        match last {
            Position::End => self.len() - self.rank(first),
            Position::At(_) => self.rank(last).saturating_sub(self.rank(first)),
        }
    }

    /// The node with exactly `rank` smaller keys, or [`Position::End`] if
    /// `rank >= len()`.
    pub fn select(&self, mut rank: usize) -> Position {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            let left = self.size_of(node.left);
            match rank.cmp(&left) {
                Less => current = node.left,
                Equal => return Position::At(id),
                Greater => {
                    rank -= left + 1;
                    current = node.right;
                }
            }
        }
        Position::End
    }

    /// In-order iterator over the keys, smallest first.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }
}

impl<K: Ord> RankTree<K> {
    /// Adds `key`, returning `false` without touching the tree if it is
    /// already present.
    pub fn insert(&mut self, key: K) -> bool {
        let Some(mut current) = self.root else {
            let id = self.nodes.alloc(Node::new(key, None));
            self.node_mut(id).color = Color::Black;
            self.root = Some(id);
            debug!("inserted {id} as root");
            return true;
        };

        let side = loop {
            let node = self.node(current);
            let side = match key.cmp(&node.key) {
                Equal => {
                    debug!("duplicate of {current} ignored");
                    return false;
                }
                Less => Side::Left,
                Greater => Side::Right,
            };
            match node.child(side) {
                Some(next) => current = next,
                None => break side,
            }
        };

        let id = self.nodes.alloc(Node::new(key, Some(current)));
        self.node_mut(current).set_child(side, Some(id));

        let mut ancestor = Some(current);
        while let Some(up) = ancestor {
            let node = self.node_mut(up);
            node.size += 1;
            ancestor = node.parent;
        }

        self.insert_fixup(id);
        debug!("inserted {id} under {current}, {} keys", self.len());
        true
    }

    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            match key.cmp(node.key.borrow()) {
                Equal => return Some(id),
                Less => current = node.left,
                Greater => current = node.right,
            }
        }
        None
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// The leftmost node whose key is `>= key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bound(|node| <K as Borrow<Q>>::borrow(node) >= key)
    }

    /// The leftmost node whose key is `> key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bound(|node| <K as Borrow<Q>>::borrow(node) > key)
    }

    // `pred` must be monotone in sorted order: false, ..., false, true, ...
    fn bound(&self, pred: impl Fn(&K) -> bool) -> Position {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            if pred(&node.key) {
                candidate = Some(id);
                current = node.left;
            } else {
                current = node.right;
            }
        }
        candidate.into()
    }

    /// Number of stored keys in `[lo, hi]`; 0 when `lo > hi`.
    pub fn count_in_range<Q>(&self, lo: &Q, hi: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.distance(self.lower_bound(lo), self.upper_bound(hi))
    }
}

impl<K: Ord> Extend<K> for RankTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for RankTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = RankTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Debug> Debug for RankTree<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
