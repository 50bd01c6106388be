#[macro_use]
mod kind;
pub mod dump;
mod node;
mod token;
pub mod visit;

pub use kind::{Arity, SyntaxKind};
pub use node::{Leaf, SyntaxNode, Tree};
pub use token::{Token, Trivia};
