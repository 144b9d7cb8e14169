use std::iter::FusedIterator;

use crate::{NodeId, RankTree};

/// An in-order iterator over the keys of a [`RankTree`].
///
/// Walks successor links lazily; both ends meet in the middle, so the
/// iterator is double-ended and knows its exact length.
pub struct Iter<'a, K> {
    tree: &'a RankTree<K>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(tree: &'a RankTree<K>) -> Self {
        Iter {
            tree,
            front: tree.first_node(),
            back: tree.last_node(),
            remaining: tree.len(),
        }
    }
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = self.tree.successor(current);
        Some(self.tree.key(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> DoubleEndedIterator for Iter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = self.tree.predecessor(current);
        Some(self.tree.key(current))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
impl<K> FusedIterator for Iter<'_, K> {}

impl<'a, K> IntoIterator for &'a RankTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
