use std::fmt::Debug;

use super::{Color, Node, NodeId, Side};

impl<K> Node<K> {
    /// A fresh red leaf hanging from `parent`.
    pub(crate) fn new(key: K, parent: Option<NodeId>) -> Self {
        Node {
            key,
            color: Color::Red,
            size: 1,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline(always)]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline(always)]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    #[inline(always)]
    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    /// Number of keys in the subtree rooted at this node.
    #[inline(always)]
    pub fn subtree_size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline(always)]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    #[inline(always)]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    #[inline(always)]
    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline(always)]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// The side `child` hangs from, if it is a child of this node at all.
    #[inline(always)]
    pub(crate) fn side_of(&self, child: NodeId) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

impl<K: Debug> Debug for Node<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{:?}::({:?},{})",
            self.color, self.key, self.size
        ))
    }
}
