use std::iter::FusedIterator;
use std::str::Chars;

use crate::position::Position;
use crate::source::SourceFile;

/// A forward-only view over source text.
///
/// The cursor never rewinds. A mark remembers where the current lexeme began so that the scanned
/// text can be sliced out once the lexeme is complete.
#[derive(Debug, Clone)]
pub struct Cursor<'buf> {
    text: &'buf str,
    chars: Chars<'buf>,
    pos: Position,
    mark: Position,
}

impl<'buf> Cursor<'buf> {
    pub fn new(text: &'buf str) -> Self {
        Self {
            text,
            chars: text.chars(),
            pos: Position::default(),
            mark: Position::default(),
        }
    }

    pub fn from_source_file(src_file: &SourceFile<'buf>) -> Self {
        Self::new(src_file.text())
    }

    /// Returns the position of the immediately following character.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Returns the position recorded by the last [`start_mark`](Self::start_mark).
    pub fn mark_pos(&self) -> Position {
        self.mark
    }

    /// Returns the `k`-th character ahead without consuming anything, or `None` past the end.
    pub fn peek(&self, k: usize) -> Option<char> {
        self.chars.clone().nth(k)
    }

    pub fn at_end(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Moves forward by `n` characters, stopping at the end of input.
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if self.next().is_none() {
                break;
            }
        }
    }

    pub fn start_mark(&mut self) {
        self.mark = self.pos;
    }

    /// Returns the text between the mark and the current position.
    pub fn marked_slice(&self) -> &'buf str {
        &self.text[self.mark.byte..self.pos.byte]
    }

    pub fn consume_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'buf str {
        let start = self.pos.byte;

        while matches!(self.peek(0), Some(c) if predicate(c)) {
            self.next();
        }

        &self.text[start..self.pos.byte]
    }
}

impl<'buf> Iterator for Cursor<'buf> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        self.pos.byte += c.len_utf8();

        match c {
            '\r' if self.peek(0) == Some('\n') => self.pos.col += 1,

            '\n' | '\r' => {
                self.pos.line += 1;
                self.pos.col = 1;
            }

            _ => self.pos.col += 1,
        }

        Some(c)
    }
}

impl<'buf> FusedIterator for Cursor<'buf> {}
