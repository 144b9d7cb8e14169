use log::trace;

use super::{Color, Node, NodeId, RankTree, Side};

// Link helpers. Absent children behave as black leaves of size zero.
impl<K> RankTree<K> {
    #[inline(always)]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K> {
        self.nodes.get(id)
    }

    #[inline(always)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.nodes.get_mut(id)
    }

    #[inline(always)]
    pub(crate) fn size_of(&self, link: Option<NodeId>) -> usize {
        link.map_or(0, |id| self.node(id).size)
    }

    #[inline(always)]
    pub(crate) fn is_red(&self, link: Option<NodeId>) -> bool {
        link.is_some_and(|id| self.node(id).is_red())
    }

    #[inline(always)]
    fn set_color(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    #[inline(always)]
    fn set_parent(&mut self, link: Option<NodeId>, parent: Option<NodeId>) {
        if let Some(id) = link {
            self.node_mut(id).parent = parent;
        }
    }

    /// Points whatever referenced `old` (its parent or the root) at `new`.
    fn change_child(&mut self, old: NodeId, new: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(parent) => {
                let parent = self.node_mut(parent);
                if parent.left == Some(old) {
                    parent.left = Some(new);
                } else {
                    parent.right = Some(new);
                }
            }
            None => self.root = Some(new),
        }
    }

    #[inline]
    fn update_size(&mut self, id: NodeId) {
        let node = self.node(id);
        let size = 1 + self.size_of(node.left) + self.size_of(node.right);
        self.node_mut(id).size = size;
    }

    /// Rotates the subtree at `x` towards `side`.
    ///
    /// `Side::Left` is the classic left rotation:
    ///
    /// ```text
    ///       x                 y
    ///      / \               / \
    ///     a   y     -->     x   c
    ///        / \           / \
    ///       b   c         a   b
    /// ```
    ///
    /// and `Side::Right` its mirror. Every link touched (both children
    /// slots, three parent links, and the parent's or root's reference) is
    /// rewritten before the call returns, then the sizes of `x` and `y` are
    /// recomputed in that order. Without a child opposite to `side` there is
    /// nothing to lift and the tree is left alone.
    pub(crate) fn rotate(&mut self, x: NodeId, side: Side) {
        let Some(y) = self.node(x).child(side.opposite()) else {
            return;
        };
        trace!("rotate {side:?} at {x}, lifting {y}");

        let inner = self.node(y).child(side);
        let parent = self.node(x).parent;

        self.node_mut(x).set_child(side.opposite(), inner);
        self.set_parent(inner, Some(x));

        self.node_mut(y).parent = parent;
        self.change_child(x, y, parent);

        self.node_mut(y).set_child(side, Some(x));
        self.node_mut(x).parent = Some(y);

        self.update_size(x);
        self.update_size(y);
    }

    /// Restores the red-black properties after `node` was attached as a red
    /// leaf and the sizes above it were bumped.
    pub(crate) fn insert_fixup(&mut self, mut node: NodeId) {
        loop {
            /*
             * Loop invariant: node is red.
             */
            let Some(mut parent) = self.node(node).parent else {
                // node is the root, fixed up below.
                break;
            };

            /*
             * A black parent cannot be part of a red-red edge: done.
             */
            if self.node(parent).is_black() {
                break;
            }

            // A red parent is never the root, the root is always black.
            let Some(gparent) = self.node(parent).parent else {
                break;
            };
            let Some(side) = self.node(gparent).side_of(parent) else {
                break;
            };
            let uncle = self.node(gparent).child(side.opposite());

            if self.is_red(uncle) {
                /*
                 * Case A - uncle is red (color flips).
                 *
                 *       G            g
                 *      / \          / \
                 *     p   u  -->   P   U
                 *    /            /
                 *   n            n
                 *
                 * g may now have a red parent, keep walking up from there.
                 */
                trace!("uncle of {node} is red, recoloring at {gparent}");
                self.set_color(parent, Color::Black);
                if let Some(uncle) = uncle {
                    self.set_color(uncle, Color::Black);
                }
                self.set_color(gparent, Color::Red);
                node = gparent;
                continue;
            }

            if self.node(parent).child(side.opposite()) == Some(node) {
                /*
                 * Case B - uncle is black and node is an inner grandchild
                 * (rotate at parent, shown for side == Left).
                 *
                 *      G             G
                 *     / \           / \
                 *    p   U  -->    n   U
                 *     \           /
                 *      n         p
                 *
                 * The red-red edge is still there, now on the outside:
                 * fall through to Case C with the roles swapped.
                 */
                trace!("{node} is an inner grandchild, rotating at {parent}");
                self.rotate(parent, side);
                node = parent;
                parent = match self.node(node).parent {
                    Some(parent) => parent,
                    None => break,
                };
            }

            /*
             * Case C - uncle is black and node is an outer grandchild
             * (rotate at gparent, shown for side == Left).
             *
             *        G           P
             *       / \         / \
             *      p   U  -->  n   g
             *     /                 \
             *    n                   U
             */
            trace!("{node} is an outer grandchild, rotating at {gparent}");
            self.set_color(parent, Color::Black);
            self.set_color(gparent, Color::Red);
            self.rotate(gparent, side.opposite());
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    // Allocates a black node and hangs it from `$parent` on `$side`. Sizes
    // are fixed afterwards with `resize`.
    macro_rules! link {
        ($tree:expr, $key:expr) => {{
            let id = $tree.nodes.alloc(Node::new($key, None));
            $tree.node_mut(id).color = Color::Black;
            $tree.root = Some(id);
            id
        }};
        ($tree:expr, $key:expr, $parent:expr, $side:expr) => {{
            let id = $tree.nodes.alloc(Node::new($key, Some($parent)));
            $tree.node_mut(id).color = Color::Black;
            $tree.node_mut($parent).set_child($side, Some(id));
            id
        }};
    }

    fn resize(tree: &mut RankTree<i32>, id: Option<NodeId>) -> usize {
        let Some(id) = id else { return 0 };
        let left = tree.node(id).left;
        let right = tree.node(id).right;
        let size = 1 + resize(tree, left) + resize(tree, right);
        tree.node_mut(id).size = size;
        size
    }

    fn shape(tree: &RankTree<i32>, id: NodeId) -> (Option<i32>, Option<i32>, Option<i32>, usize) {
        let node = tree.node(id);
        let key = |link: Option<NodeId>| link.map(|id| tree.node(id).key);
        (key(node.parent), key(node.left), key(node.right), node.size)
    }

    /// x(10) with a(5) on the left and y(20) carrying b(15), c(25).
    fn right_heavy(tree: &mut RankTree<i32>, above: Option<(NodeId, Side)>) -> NodeId {
        let x = match above {
            Some((parent, side)) => link!(tree, 10, parent, side),
            None => link!(tree, 10),
        };
        link!(tree, 5, x, Side::Left);
        let y = link!(tree, 20, x, Side::Right);
        link!(tree, 15, y, Side::Left);
        link!(tree, 25, y, Side::Right);
        x
    }

    /// x(10) with y(5) carrying a(2), b(7), and c(20) on the right.
    fn left_heavy(tree: &mut RankTree<i32>, above: Option<(NodeId, Side)>) -> NodeId {
        let x = match above {
            Some((parent, side)) => link!(tree, 10, parent, side),
            None => link!(tree, 10),
        };
        let y = link!(tree, 5, x, Side::Left);
        link!(tree, 2, y, Side::Left);
        link!(tree, 7, y, Side::Right);
        link!(tree, 20, x, Side::Right);
        x
    }

    #[test]
    fn rotate_left_at_root() {
        let mut tree = RankTree::new();
        let x = right_heavy(&mut tree, None);
        let y = tree.node(x).right.unwrap();
        let root = tree.root;
        resize(&mut tree, root);

        tree.rotate(x, Side::Left);

        assert_eq!(Some(y), tree.root);
        assert_eq!((None, Some(10), Some(25), 5), shape(&tree, y));
        assert_eq!((Some(20), Some(5), Some(15), 3), shape(&tree, x));
        let b = tree.node(x).right.unwrap();
        assert_eq!((Some(10), None, None, 1), shape(&tree, b));
        let keys: Vec<_> = tree.iter().copied().collect();
        assert_eq!(vec![5, 10, 15, 20, 25], keys);
    }

    #[test]
    fn rotate_left_below_root() {
        let mut tree = RankTree::new();
        let top = link!(tree, 100);
        let x = right_heavy(&mut tree, Some((top, Side::Left)));
        let y = tree.node(x).right.unwrap();
        let root = tree.root;
        resize(&mut tree, root);

        tree.rotate(x, Side::Left);

        assert_eq!(Some(top), tree.root);
        assert_eq!((None, Some(20), None, 6), shape(&tree, top));
        assert_eq!((Some(100), Some(10), Some(25), 5), shape(&tree, y));
        assert_eq!((Some(20), Some(5), Some(15), 3), shape(&tree, x));
    }

    #[test]
    fn rotate_right_at_root() {
        let mut tree = RankTree::new();
        let x = left_heavy(&mut tree, None);
        let y = tree.node(x).left.unwrap();
        let root = tree.root;
        resize(&mut tree, root);

        tree.rotate(x, Side::Right);

        assert_eq!(Some(y), tree.root);
        assert_eq!((None, Some(2), Some(10), 5), shape(&tree, y));
        assert_eq!((Some(5), Some(7), Some(20), 3), shape(&tree, x));
        let b = tree.node(x).left.unwrap();
        assert_eq!((Some(10), None, None, 1), shape(&tree, b));
        let keys: Vec<_> = tree.iter().copied().collect();
        assert_eq!(vec![2, 5, 7, 10, 20], keys);
    }

    #[test]
    fn rotate_right_below_root() {
        let mut tree = RankTree::new();
        let top = link!(tree, 0);
        let x = left_heavy(&mut tree, Some((top, Side::Right)));
        let y = tree.node(x).left.unwrap();
        let root = tree.root;
        resize(&mut tree, root);

        tree.rotate(x, Side::Right);

        assert_eq!(Some(top), tree.root);
        assert_eq!((None, None, Some(5), 6), shape(&tree, top));
        assert_eq!((Some(0), Some(2), Some(10), 5), shape(&tree, y));
        assert_eq!((Some(5), Some(7), Some(20), 3), shape(&tree, x));
    }

    #[test]
    fn rotations_undo_each_other() {
        let mut tree = RankTree::new();
        let x = right_heavy(&mut tree, None);
        let root = tree.root;
        resize(&mut tree, root);
        let before: Vec<_> = (0..5)
            .map(|i| shape(&tree, NodeId::from_index(i)))
            .collect();

        tree.rotate(x, Side::Left);
        let y = tree.root.unwrap();
        tree.rotate(y, Side::Right);

        let after: Vec<_> = (0..5)
            .map(|i| shape(&tree, NodeId::from_index(i)))
            .collect();
        assert_eq!(Some(x), tree.root);
        assert_eq!(before, after);
    }

    #[test]
    fn rotate_without_pivot_is_a_noop() {
        let mut tree = RankTree::new();
        let x = link!(tree, 1);
        link!(tree, 0, x, Side::Left);
        let root = tree.root;
        resize(&mut tree, root);

        tree.rotate(x, Side::Left);

        assert_eq!(Some(x), tree.root);
        assert_eq!((None, Some(0), None, 2), shape(&tree, x));
    }

    #[test]
    fn fixup_inner_grandchild() {
        // 3 <- 1 -> 2 forces Case B then Case C.
        let mut tree = RankTree::new();
        tree.insert(3);
        tree.insert(1);
        tree.insert(2);

        let root = tree.root.unwrap();
        assert_eq!((None, Some(1), Some(3), 3), shape(&tree, root));
        assert_eq!(Color::Black, tree.node(root).color);
        let left = tree.node(root).left.unwrap();
        let right = tree.node(root).right.unwrap();
        assert_eq!(Color::Red, tree.node(left).color);
        assert_eq!(Color::Red, tree.node(right).color);
    }

    #[test]
    fn fixup_red_uncle_recolors() {
        let mut tree = RankTree::new();
        for key in [10, 5, 15, 1] {
            tree.insert(key);
        }

        let root = tree.root.unwrap();
        assert_eq!(10, tree.node(root).key);
        assert_eq!(Color::Black, tree.node(root).color);
        let five = tree.node(root).left.unwrap();
        let fifteen = tree.node(root).right.unwrap();
        let one = tree.node(five).left.unwrap();
        assert_eq!(Color::Black, tree.node(five).color);
        assert_eq!(Color::Black, tree.node(fifteen).color);
        assert_eq!(Color::Red, tree.node(one).color);
        assert!(tree.verify());
    }
}
