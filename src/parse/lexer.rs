use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};
use std::iter::FusedIterator;

use serde::Serialize;
use tracing::trace;

use crate::parse::cursor::Cursor;
use crate::position::{HasSpan, Span};
use crate::syntax::{SyntaxKind, Token, Trivia};

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_line_break(c)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continuation(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum LexerErrorKind {
    UnrecognizedCharacter(char),
    MalformedChar,
    UnterminatedString,
    UnterminatedComment,
}

impl Display for LexerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::UnrecognizedCharacter(c) = self {
            write!(f, "encountered an unrecognized character '")?;

            if c.is_control() {
                write!(f, "{}", c.escape_unicode())?;
            } else {
                write!(f, "{}", c)?;
            }

            return write!(f, "'");
        }

        write!(
            f,
            "{}",
            match self {
                Self::MalformedChar => "a character literal must be a single character in quotes",
                Self::UnterminatedString => "the string is not terminated",
                Self::UnterminatedComment => "the block comment is not terminated",

                Self::UnrecognizedCharacter(_) => unreachable!(),
            }
        )
    }
}

#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub struct LexerError {
    span: Span,
    kind: LexerErrorKind,
}

impl LexerError {
    pub fn kind(&self) -> LexerErrorKind {
        self.kind
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lexical analysis failed: {}", self.kind)
    }
}

impl Error for LexerError {}

impl HasSpan for LexerError {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}

/// Which edge of a token a run of trivia is collected for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum TriviaEdge {
    /// Everything up to the next significant character, across any number of lines.
    Leading,

    /// Everything up to and including the first line break.
    Trailing,
}

#[derive(Debug, Clone)]
pub struct Lexer<'buf> {
    cursor: Cursor<'buf>,
    error: Option<LexerError>,
    exhausted: bool,
}

impl<'buf> Lexer<'buf> {
    pub fn new(cursor: Cursor<'buf>) -> Self {
        Self {
            cursor,
            error: None,
            exhausted: false,
        }
    }

    fn create_error(&self, kind: LexerErrorKind) -> LexerError {
        LexerError {
            span: Span {
                start: self.cursor.mark_pos(),
                end: self.cursor.pos(),
            },
            kind,
        }
    }

    /// Scans the next token together with its trivia.
    ///
    /// At the end of input an `EndOfFile` token is returned, on this and every later call. Once an
    /// error has been reported, every later call reports it again.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }

        let result = self.scan_token();

        match &result {
            Ok(token) => trace!(kind = ?token.kind, text = %token.text, span = %token.span),
            Err(e) => self.error = Some(e.clone()),
        }

        result
    }

    fn scan_token(&mut self) -> Result<Token, LexerError> {
        let leading_trivia = self.scan_trivia(TriviaEdge::Leading)?;

        self.cursor.start_mark();

        let kind = match self.cursor.peek(0) {
            None => SyntaxKind::EndOfFile,
            Some(c) => self.scan_significant(c)?,
        };

        let span = Span {
            start: self.cursor.mark_pos(),
            end: self.cursor.pos(),
        };
        let text = self.cursor.marked_slice().to_owned();

        let trailing_trivia = match kind {
            SyntaxKind::EndOfFile => vec![],
            _ => self.scan_trivia(TriviaEdge::Trailing)?,
        };

        Ok(Token {
            kind,
            text,
            span,
            leading_trivia,
            trailing_trivia,
        })
    }

    fn scan_trivia(&mut self, edge: TriviaEdge) -> Result<Vec<Trivia>, LexerError> {
        let mut trivia = Vec::new();

        loop {
            self.cursor.start_mark();

            let kind = match self.cursor.peek(0) {
                Some('\r') if self.cursor.peek(1) == Some('\n') => {
                    self.cursor.advance(2);

                    SyntaxKind::EndOfLine
                }

                Some(c) if is_line_break(c) => {
                    self.cursor.advance(1);

                    SyntaxKind::EndOfLine
                }

                Some('#') => {
                    self.cursor.consume_while(|c| !is_line_break(c));

                    SyntaxKind::LineComment
                }

                Some('{') => {
                    self.skip_block_comment()?;

                    SyntaxKind::BlockComment
                }

                Some(c) if is_whitespace(c) => {
                    self.cursor.consume_while(is_whitespace);

                    SyntaxKind::Whitespace
                }

                _ => break,
            };

            trivia.push(Trivia::new(kind, self.cursor.marked_slice()));

            if edge == TriviaEdge::Trailing && kind == SyntaxKind::EndOfLine {
                break;
            }
        }

        Ok(trivia)
    }

    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        self.cursor.advance(1);
        self.cursor.consume_while(|c| c != '}');

        if self.cursor.at_end() {
            return Err(self.create_error(LexerErrorKind::UnterminatedComment));
        }

        self.cursor.advance(1);

        Ok(())
    }

    fn take(&mut self, n: usize, kind: SyntaxKind) -> SyntaxKind {
        self.cursor.advance(n);

        kind
    }

    fn scan_significant(&mut self, c: char) -> Result<SyntaxKind, LexerError> {
        Ok(match c {
            '+' => self.take(1, SyntaxKind::Plus),
            '-' => self.take(1, SyntaxKind::Minus),
            '*' => self.take(1, SyntaxKind::Asterisk),
            '/' => self.take(1, SyntaxKind::Slash),
            '=' => self.take(1, SyntaxKind::Eq),
            '(' => self.take(1, SyntaxKind::ParenLeft),
            ')' => self.take(1, SyntaxKind::ParenRight),
            ';' => self.take(1, SyntaxKind::Semicolon),
            ',' => self.take(1, SyntaxKind::Comma),

            ':' => match (self.cursor.peek(1), self.cursor.peek(2)) {
                (Some('='), Some(':')) => self.take(3, SyntaxKind::ColonEqColon),
                (Some('='), _) => self.take(2, SyntaxKind::ColonEq),
                _ => self.take(1, SyntaxKind::Colon),
            },

            '.' => match self.cursor.peek(1) {
                Some('.') => self.take(2, SyntaxKind::DotDot),
                _ => self.take(1, SyntaxKind::Dot),
            },

            '<' => match self.cursor.peek(1) {
                Some('=') => self.take(2, SyntaxKind::LessEq),
                Some('>') => self.take(2, SyntaxKind::LessGreater),
                _ => self.take(1, SyntaxKind::Less),
            },

            '>' => match self.cursor.peek(1) {
                Some('=') => self.take(2, SyntaxKind::GreaterEq),
                _ => self.take(1, SyntaxKind::Greater),
            },

            '\'' => self.scan_char()?,
            '"' => self.scan_string()?,

            c if c.is_ascii_digit() => {
                self.cursor.consume_while(|c| c.is_ascii_digit());

                SyntaxKind::Integer
            }

            c if is_ident_start(c) => self.scan_ident_or_keyword(),

            c => {
                self.cursor.advance(1);

                return Err(self.create_error(LexerErrorKind::UnrecognizedCharacter(c)));
            }
        })
    }

    fn scan_char(&mut self) -> Result<SyntaxKind, LexerError> {
        match (self.cursor.peek(1), self.cursor.peek(2)) {
            (Some(c), Some('\'')) if !is_line_break(c) => Ok(self.take(3, SyntaxKind::Char)),

            _ => {
                self.cursor.advance(1);

                Err(self.create_error(LexerErrorKind::MalformedChar))
            }
        }
    }

    fn scan_string(&mut self) -> Result<SyntaxKind, LexerError> {
        self.cursor.advance(1);
        self.cursor.consume_while(|c| c != '"');

        if self.cursor.at_end() {
            return Err(self.create_error(LexerErrorKind::UnterminatedString));
        }

        Ok(self.take(1, SyntaxKind::String))
    }

    fn scan_ident_or_keyword(&mut self) -> SyntaxKind {
        let ident = self.cursor.consume_while(is_ident_continuation);

        SyntaxKind::keyword(ident).unwrap_or(SyntaxKind::Identifier)
    }
}

/// Yields every token up to and including `EndOfFile`, or up to the first error.
impl<'buf> Iterator for Lexer<'buf> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let result = self.next_token();
        self.exhausted = !matches!(&result, Ok(token) if !token.is_eof());

        Some(result)
    }
}

impl<'buf> FusedIterator for Lexer<'buf> {}
