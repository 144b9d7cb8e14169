//! An order-statistics red-black tree.
//!
//! [`RankTree`] is a set of ordered keys kept balanced with the red-black
//! discipline. Every node also carries the size of the subtree rooted at it,
//! which turns rank and range-count questions into a single descent:
//!
//! ```
//! use rangetree::RankTree;
//!
//! let mut tree: RankTree<i64> = [2, 4, 6, 8].into_iter().collect();
//! tree.insert(6); // duplicates are ignored
//!
//! assert_eq!(4, tree.len());
//! assert_eq!(2, tree.count_in_range(&3, &6));
//! let first = tree.lower_bound(&5);
//! assert_eq!(Some(&6), tree.key_at(first));
//! assert_eq!(2, tree.rank(first));
//! assert!(tree.verify());
//! ```
//!
//! Nodes live in an arena owned by the tree and refer to each other through
//! [`NodeId`]s, so parent links never own anything.
mod arena;
mod iter;
mod node;
mod root;
mod tree;
mod verify;

pub mod command;
pub mod dump;

pub use arena::NodeId;
pub use iter::Iter;
pub use verify::Violation;

use arena::Arena;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red = 0,
    Black = 1,
}

/// Which child slot of a parent a node hangs from. Also used as the
/// direction of a rotation: rotating to the `Left` lifts the right child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline(always)]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Result of a bound search: either a stored node or one past the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    At(NodeId),
    End,
}

impl Position {
    #[inline]
    pub fn node(self) -> Option<NodeId> {
        match self {
            Position::At(id) => Some(id),
            Position::End => None,
        }
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self == Position::End
    }
}

impl From<Option<NodeId>> for Position {
    fn from(node: Option<NodeId>) -> Position {
        node.map_or(Position::End, Position::At)
    }
}

#[derive(Clone, PartialEq)]
pub struct Node<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    // Number of nodes in the subtree rooted here, this one included.
    pub(crate) size: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

/// A red-black tree of distinct keys augmented with subtree sizes.
#[derive(Clone)]
pub struct RankTree<K> {
    nodes: Arena<Node<K>>,
    root: Option<NodeId>,
}
