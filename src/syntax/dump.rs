use std::io::{self, Write};

use crate::syntax::SyntaxNode;

/// Writes `node` in the indented debug form, one node per line:
///
/// ```text
/// program(7)
/// . <identifier>(1)
/// . . t(0)
/// . consts(0)
/// ```
pub fn dump_tree(node: &SyntaxNode, mut out: impl Write) -> io::Result<()> {
    dump_node(node, 0, &mut out)
}

pub fn dump_tree_to_string(node: &SyntaxNode) -> String {
    let mut buf = vec![];
    dump_tree(node, &mut buf).expect("writing to a Vec never fails");

    String::from_utf8(buf).expect("the dump is built from valid utf-8")
}

fn write_indent(depth: usize, out: &mut impl Write) -> io::Result<()> {
    for _ in 0..depth {
        out.write_all(b". ")?;
    }

    Ok(())
}

fn dump_node(node: &SyntaxNode, depth: usize, out: &mut impl Write) -> io::Result<()> {
    write_indent(depth, out)?;
    writeln!(out, "{}", node)?;

    match node {
        SyntaxNode::Tree(tree) => {
            for child in tree.children() {
                dump_node(child, depth + 1, out)?;
            }
        }

        SyntaxNode::Leaf(leaf) => {
            write_indent(depth + 1, out)?;
            writeln!(out, "{}", leaf.token())?;
        }
    }

    Ok(())
}
