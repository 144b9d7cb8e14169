use thiserror::Error;

use crate::{NodeId, RankTree, Side};

/// The first structural invariant found broken by [`RankTree::check`].
///
/// Only a defect in the tree itself can produce one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("root {0} is red")]
    RedRoot(NodeId),

    #[error("root {0} has a parent")]
    RootHasParent(NodeId),

    #[error("red node {parent} has red child {child}")]
    RedChildOfRed { parent: NodeId, child: NodeId },

    #[error("black height below {node} differs: {left} on the left, {right} on the right")]
    BlackHeightMismatch {
        node: NodeId,
        left: usize,
        right: usize,
    },

    #[error("key of {0} is out of order with its ancestors")]
    OrderViolated(NodeId),

    #[error("{child} is linked under {parent} but points back at {found:?}")]
    BrokenParentLink {
        parent: NodeId,
        child: NodeId,
        found: Option<NodeId>,
    },

    #[error("subtree size of {node} is {found}, expected {expected}")]
    SizeMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("tree reaches {reachable} nodes but owns {allocated}")]
    LengthMismatch { reachable: usize, allocated: usize },
}

impl<K: Ord> RankTree<K> {
    /// Whether every structural invariant holds.
    pub fn verify(&self) -> bool {
        self.check().is_ok()
    }

    /// Walks the whole tree and reports the first broken invariant:
    /// black root, no red-red edge, uniform black height, strict key order,
    /// consistent parent links and subtree sizes.
    pub fn check(&self) -> Result<(), Violation> {
        let Some(root) = self.root else {
            if self.nodes.len() != 0 {
                return Err(Violation::LengthMismatch {
                    reachable: 0,
                    allocated: self.nodes.len(),
                });
            }
            return Ok(());
        };

        let node = self.node(root);
        if node.parent.is_some() {
            return Err(Violation::RootHasParent(root));
        }
        if node.is_red() {
            return Err(Violation::RedRoot(root));
        }

        self.check_subtree(root, None, None)?;

        if node.size != self.nodes.len() {
            return Err(Violation::LengthMismatch {
                reachable: node.size,
                allocated: self.nodes.len(),
            });
        }
        Ok(())
    }

    // Returns the black height below `id`, absent children counting as 0.
    fn check_subtree(&self, id: NodeId, lower: Option<&K>, upper: Option<&K>) -> Result<usize, Violation> {
        let node = self.node(id);
        if lower.is_some_and(|lower| node.key <= *lower) || upper.is_some_and(|upper| node.key >= *upper) {
            return Err(Violation::OrderViolated(id));
        }

        let mut heights = [0; 2];
        for (slot, side) in [Side::Left, Side::Right].into_iter().enumerate() {
            let Some(child) = node.child(side) else {
                continue;
            };
            let found = self.node(child).parent;
            if found != Some(id) {
                return Err(Violation::BrokenParentLink {
                    parent: id,
                    child,
                    found,
                });
            }
            if node.is_red() && self.node(child).is_red() {
                return Err(Violation::RedChildOfRed { parent: id, child });
            }
            heights[slot] = match side {
                Side::Left => self.check_subtree(child, lower, Some(&node.key))?,
                Side::Right => self.check_subtree(child, Some(&node.key), upper)?,
            };
        }

        let [left, right] = heights;
        if left != right {
            return Err(Violation::BlackHeightMismatch { node: id, left, right });
        }

        let expected = 1 + self.size_of(node.left) + self.size_of(node.right);
        if node.size != expected {
            return Err(Violation::SizeMismatch {
                node: id,
                expected,
                found: node.size,
            });
        }

        Ok(left + usize::from(node.is_black()))
    }
}
