use std::collections::VecDeque;

use tracing::trace;

use crate::parse::lexer::Lexer;
use crate::parse::parser::{InternalError, ParserError};
use crate::syntax::Token;

pub const DEFAULT_CAPACITY: usize = 10;

/// A fixed-capacity window of tokens ahead of the parser.
///
/// The grammar is LL(2); the capacity is headroom, and peeking beyond it is reported as a bug in
/// the parser rather than silently growing the buffer.
#[derive(Debug, Clone)]
pub struct Lookahead<'buf> {
    lexer: Lexer<'buf>,
    buf: VecDeque<Token>,
    capacity: usize,
    max_peek: usize,
}

impl<'buf> Lookahead<'buf> {
    pub fn new(lexer: Lexer<'buf>) -> Self {
        Self::with_capacity(lexer, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(lexer: Lexer<'buf>, capacity: usize) -> Self {
        Self {
            lexer,
            buf: VecDeque::with_capacity(capacity),
            capacity,
            max_peek: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The largest distance ever passed to [`peek`](Self::peek).
    pub fn max_peek(&self) -> usize {
        self.max_peek
    }

    /// Returns the token `k` positions ahead without consuming it.
    pub fn peek(&mut self, k: usize) -> Result<&Token, ParserError> {
        if k >= self.capacity {
            return Err(InternalError::LookaheadExceeded {
                requested: k,
                capacity: self.capacity,
            }
            .into());
        }

        self.max_peek = self.max_peek.max(k);

        while self.buf.len() <= k {
            let token = self.lexer.next_token()?;
            trace!(buffered = self.buf.len() + 1, kind = ?token.kind, "filled the lookahead buffer");
            self.buf.push_back(token);
        }

        Ok(&self.buf[k])
    }

    /// Removes and returns the next token.
    pub fn consume(&mut self) -> Result<Token, ParserError> {
        match self.buf.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.lexer.next_token()?),
        }
    }
}
