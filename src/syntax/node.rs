use std::fmt::{self, Display};

use serde::Serialize;

use crate::syntax::{SyntaxKind, Token};

/// An interior node. The children follow the right-hand side of the production named by `kind`.
#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct Tree {
    kind: SyntaxKind,
    children: Vec<SyntaxNode>,
}

impl Tree {
    pub(crate) fn new(kind: SyntaxKind, children: Vec<SyntaxNode>) -> Self {
        Self { kind, children }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    pub fn child(&self, idx: usize) -> Option<&SyntaxNode> {
        self.children.get(idx)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A terminal wrapping an identifier or a literal token.
#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct Leaf {
    token: Token,
}

impl Leaf {
    pub(crate) fn new(token: Token) -> Self {
        Self { token }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.token.kind
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn text(&self) -> &str {
        &self.token.text
    }
}

#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub enum SyntaxNode {
    Tree(Tree),
    Leaf(Leaf),
}

impl SyntaxNode {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Tree(tree) => tree.kind(),
            Self::Leaf(leaf) => leaf.kind(),
        }
    }

    /// The ordered children of an interior node; empty for a leaf.
    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            Self::Tree(tree) => tree.children(),
            Self::Leaf(_) => &[],
        }
    }

    pub fn child(&self, idx: usize) -> Option<&SyntaxNode> {
        self.children().get(idx)
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Tree(_) => None,
            Self::Leaf(leaf) => Some(leaf.token()),
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Tree(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Tree(_) => None,
            Self::Leaf(leaf) => Some(leaf),
        }
    }

    /// Iterates over this node and all of its descendants in pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = &SyntaxNode> {
        let mut stack = vec![self];

        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());

            Some(node)
        })
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.children.len())
    }
}

impl Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(1)", self.kind())
    }
}

impl Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(tree) => tree.fmt(f),
            Self::Leaf(leaf) => leaf.fmt(f),
        }
    }
}

impl From<Tree> for SyntaxNode {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Leaf> for SyntaxNode {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}
