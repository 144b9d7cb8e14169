//! Graphviz export of the tree's current shape, for eyeballing rotations
//! and colors while debugging. The layout of the output is not stable.
//!
//! ```text
//! dot -Tsvg tree.dot -o tree.svg
//! ```
use std::{
    fmt::Display,
    io::{self, Write},
};

use crate::{Color, NodeId, RankTree};

/// Writes `tree` as a `digraph`: one record per node with its id, subtree
/// size, key and color, plus an edge to each child.
pub fn write_dot<K: Display, W: Write>(tree: &RankTree<K>, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph tree")?;
    writeln!(out, "{{")?;
    writeln!(out, "\trankdir = TB;")?;
    writeln!(out, "\tsplines = false;")?;

    let mut pending: Vec<NodeId> = tree.root().into_iter().collect();
    if !pending.is_empty() {
        writeln!(out)?;
    }
    while let Some(id) = pending.pop() {
        let node = tree.get(id);
        let (fill, line, font) = match node.color() {
            Color::Black => ("black", "red", "white"),
            Color::Red => ("red", "black", "black"),
        };
        let key = escape(&node.key().to_string());
        writeln!(
            out,
            "\tnode_{index} [color = {line}, style = \"filled\", fillcolor = {fill}, \
             shape = Mrecord, fontcolor = {font}, \
             label = \"{{{{<f1> {id}}} | {{<f2> size: {size} | <f3> key = {key}}}}}\"];",
            index = id.to_index(),
            size = node.subtree_size(),
        )?;
        if let Some(left) = node.left() {
            writeln!(out, "\tnode_{}:<f2>:s -> node_{}:<f1>:n;", id.to_index(), left.to_index())?;
        }
        if let Some(right) = node.right() {
            writeln!(out, "\tnode_{}:<f3>:s -> node_{}:<f1>:n;", id.to_index(), right.to_index())?;
        }
        // Right first so the left subtree comes out first.
        pending.extend(node.right());
        pending.extend(node.left());
    }

    writeln!(out, "}}")
}

// Record labels treat these as field syntax.
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl<K: Display> RankTree<K> {
    /// The [`write_dot`] output as a string.
    pub fn to_dot(&self) -> String {
        let mut out = Vec::new();
        write_dot(self, &mut out).expect("writing to a Vec cannot fail");
        String::from_utf8_lossy(&out).into_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_tree_is_an_empty_graph() {
        let tree = RankTree::<i32>::new();
        assert_eq!(
            "digraph tree\n{\n\trankdir = TB;\n\tsplines = false;\n}\n",
            tree.to_dot()
        );
    }

    #[test]
    fn records_and_edges() {
        let tree: RankTree<i32> = [2, 1, 3].into_iter().collect();
        let dot = tree.to_dot();
        let lines: Vec<_> = dot.lines().collect();

        assert_eq!("digraph tree", lines[0]);
        assert_eq!("}", *lines.last().unwrap());
        // Root is node #0 (key 2), black, with both children red.
        assert!(lines[5].starts_with("\tnode_0 [color = red, style = \"filled\", fillcolor = black"));
        assert!(lines[5].ends_with("label = \"{{<f1> #0} | {<f2> size: 3 | <f3> key = 2}}\"];"));
        assert_eq!("\tnode_0:<f2>:s -> node_1:<f1>:n;", lines[6]);
        assert_eq!("\tnode_0:<f3>:s -> node_2:<f1>:n;", lines[7]);
        assert!(lines[8].starts_with("\tnode_1 [color = black, style = \"filled\", fillcolor = red"));
        assert!(lines[8].contains("key = 1"));
        assert!(lines[9].contains("key = 3"));
        assert_eq!(11, lines.len());
    }

    #[test]
    fn escapes_record_syntax() {
        let tree: RankTree<String> = ["a|b".to_string()].into_iter().collect();
        assert!(tree.to_dot().contains("key = a\\|b}"));
    }
}
