//! Dispatch over syntax trees by node kind.
//!
//! [`Visitor`] has one required method per node kind, so a new grammar production does not compile
//! until every visitor handles it. [`DefaultVisitor`] provides methods that walk the children and is
//! the convenient choice for passes that only care about a few kinds.

use crate::syntax::{Leaf, SyntaxKind, SyntaxNode, Tree};

macro_rules! define_visitor {
    (
        keywords { $( $kw:ident = $kw_lit:literal, )+ }
        punctuation { $( $punct:ident = $punct_lit:literal, )+ }
        literals { $( $lit_kind:ident = $lit_name:literal, )+ }
        trivia { $( $trivia:ident = $trivia_name:literal, )+ }
        nodes { $( $node:ident ( $node_name:literal, $arity:expr ) => $visit:ident, )+ }
    ) => {
        pub trait Visitor
        where
            Self: Sized,
        {
            type Output;

            $(
                fn $visit(&mut self, tree: &Tree) -> Self::Output;
            )+

            fn visit_leaf(&mut self, leaf: &Leaf) -> Self::Output;
        }

        pub trait DefaultVisitor
        where
            Self: Sized,
        {
            $(
                fn $visit(&mut self, tree: &Tree) {
                    walk(self, tree);
                }
            )+

            #[allow(unused_variables)]
            fn visit_leaf(&mut self, leaf: &Leaf) {}
        }

        impl<T> Visitor for T
        where
            T: DefaultVisitor,
        {
            type Output = ();

            $(
                fn $visit(&mut self, tree: &Tree) {
                    <Self as DefaultVisitor>::$visit(self, tree);
                }
            )+

            fn visit_leaf(&mut self, leaf: &Leaf) {
                <Self as DefaultVisitor>::visit_leaf(self, leaf);
            }
        }

        fn dispatch<V: Visitor>(visitor: &mut V, tree: &Tree) -> V::Output {
            match tree.kind() {
                $( SyntaxKind::$node => visitor.$visit(tree), )+

                $( SyntaxKind::$kw )|+
                | $( SyntaxKind::$punct )|+
                | $( SyntaxKind::$lit_kind )|+
                | $( SyntaxKind::$trivia )|+ => {
                    unreachable!("a tree is tagged with a token kind {:?}", tree.kind())
                }
            }
        }
    };
}

syntax_kind_table!(define_visitor);

/// Visits every child of `tree` in order.
pub fn walk<V: Visitor>(visitor: &mut V, tree: &Tree) {
    for child in tree.children() {
        child.accept(visitor);
    }
}

impl SyntaxNode {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Tree(tree) => tree.accept(visitor),
            Self::Leaf(leaf) => visitor.visit_leaf(leaf),
        }
    }
}

impl Tree {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        dispatch(visitor, self)
    }
}
