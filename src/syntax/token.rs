use std::borrow::Cow;
use std::fmt::{self, Display};

use serde::Serialize;

use crate::position::{HasSpan, Span};
use crate::syntax::SyntaxKind;

/// Whitespace or a comment attached to the edge of a token.
#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct Trivia {
    pub kind: SyntaxKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        debug_assert!(kind.is_trivia());

        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: String,
    pub span: Span,
    pub leading_trivia: Vec<Trivia>,
    pub trailing_trivia: Vec<Trivia>,
}

impl Token {
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == SyntaxKind::EndOfFile
    }

    /// Reassembles the source text the token was scanned from, trivia included.
    pub fn full_text(&self) -> String {
        let mut result = String::new();

        for trivia in &self.leading_trivia {
            result.push_str(&trivia.text);
        }

        result.push_str(&self.text);

        for trivia in &self.trailing_trivia {
            result.push_str(&trivia.text);
        }

        result
    }
}

/// The debug form used by tree dumps: `<text>(0)`.
impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0)", self.text)
    }
}

impl HasSpan for Token {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}
