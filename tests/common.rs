#![allow(dead_code)]

use std::borrow::Cow;
use std::cell::OnceCell;

use tinyc::parse::{Cursor, EntryPoint, Lexer, Parser, ParserError};
use tinyc::syntax::{SyntaxNode, Token};

pub struct Dump<'a> {
    bytes: Cow<'a, [u8]>,
    string: OnceCell<String>,
}

impl PartialEq for Dump<'_> {
    fn eq(&self, other: &Dump) -> bool {
        self.bytes == other.bytes
    }
}

impl AsRef<str> for Dump<'_> {
    fn as_ref(&self) -> &str {
        self.string
            .get_or_init(|| String::from_utf8_lossy(&self.bytes).into_owned())
    }
}

impl<'a> From<&'a [u8]> for Dump<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
            string: OnceCell::new(),
        }
    }
}

impl From<Vec<u8>> for Dump<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Cow::Owned(bytes),
            string: OnceCell::new(),
        }
    }
}

impl From<String> for Dump<'_> {
    fn from(string: String) -> Self {
        Self::from(string.into_bytes())
    }
}

pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(Cursor::new(text))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

pub fn parse(text: &str) -> Result<SyntaxNode, ParserError> {
    parse_as(text, EntryPoint::Program)
}

pub fn parse_as(text: &str, entry: EntryPoint) -> Result<SyntaxNode, ParserError> {
    Parser::new(Lexer::new(Cursor::new(text))).parse_as(entry)
}

/// Wraps `body` into a minimal program named `t`.
pub fn program(body: &str) -> String {
    format!("program t: begin {} end t.", body)
}
