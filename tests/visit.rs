mod common;

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use tinyc::syntax::visit::{walk, DefaultVisitor, Visitor};
use tinyc::syntax::{Leaf, SyntaxKind, Tree};

use self::common::parse;

/// Computes the height of a tree, counting leaves as 1.
struct Height;

impl Height {
    fn height(&mut self, tree: &Tree) -> usize {
        1 + tree
            .children()
            .iter()
            .map(|child| child.accept(self))
            .max()
            .unwrap_or(0)
    }
}

macro_rules! delegate_to_height {
    ($( $visit:ident ),+ $(,)?) => {
        $(
            fn $visit(&mut self, tree: &Tree) -> usize {
                self.height(tree)
            }
        )+
    };
}

impl Visitor for Height {
    type Output = usize;

    delegate_to_height! {
        visit_program, visit_consts, visit_const, visit_types, visit_type, visit_lit,
        visit_subprogs, visit_fcn, visit_params, visit_dclns, visit_var, visit_block,
        visit_output, visit_out_integer, visit_out_string, visit_if, visit_while, visit_repeat,
        visit_for, visit_loop, visit_case, visit_case_clause, visit_range, visit_otherwise,
        visit_read, visit_exit, visit_return, visit_null, visit_assign, visit_swap, visit_true,
        visit_less_equal, visit_less_than, visit_greater_equal, visit_greater_than, visit_equal,
        visit_not_equal, visit_add, visit_subtract, visit_or, visit_multiply, visit_divide,
        visit_and, visit_modulo, visit_negate, visit_not, visit_eof, visit_call, visit_succ,
        visit_pred, visit_chr, visit_ord,
    }

    fn visit_leaf(&mut self, _leaf: &Leaf) -> usize {
        1
    }
}

#[derive(Default)]
struct Census {
    assignments: usize,
    callees: Vec<String>,
    identifiers: BTreeMap<String, usize>,
}

impl DefaultVisitor for Census {
    fn visit_assign(&mut self, tree: &Tree) {
        self.assignments += 1;
        walk(self, tree);
    }

    fn visit_call(&mut self, tree: &Tree) {
        if let Some(leaf) = tree.child(0).and_then(|callee| callee.as_leaf()) {
            self.callees.push(leaf.text().to_owned());
        }

        walk(self, tree);
    }

    fn visit_leaf(&mut self, leaf: &Leaf) {
        if leaf.kind() == SyntaxKind::Identifier {
            *self.identifiers.entry(leaf.text().to_owned()).or_default() += 1;
        }
    }
}

#[test]
fn test_visitor_output() {
    let root = parse("program t: begin end t.").unwrap();

    // program -> <identifier> -> token
    assert_eq!(root.accept(&mut Height), 2);

    let root = parse("program t: begin x := 1 + 2 end t.").unwrap();

    // program -> block -> assign -> + -> <integer>
    assert_eq!(root.accept(&mut Height), 5);
}

#[test]
fn test_default_visitor_walks_everything() {
    let root = parse(include_str!("parser/pass_function.tiny")).unwrap();

    let mut census = Census::default();
    root.accept(&mut census);

    assert_eq!(census.assignments, 1);
    assert_eq!(census.callees, vec!["add".to_owned()]);
    assert_eq!(census.identifiers.get("add"), Some(&3));
    assert_eq!(census.identifiers.get("integer"), Some(&4));
    assert_eq!(census.identifiers.get("t"), Some(&3));
}

#[test]
fn test_tree_accept_dispatches_on_kind() {
    let root = parse("program t: begin x :=: y end t.").unwrap();
    let block = root.child(5).and_then(|node| node.as_tree()).unwrap();

    let mut census = Census::default();
    block.accept(&mut census);

    assert_eq!(census.assignments, 0);
    assert_eq!(census.identifiers.len(), 2);
}
