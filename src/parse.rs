mod cursor;
mod lexer;
mod lookahead;
mod parser;

pub use cursor::Cursor;
pub use lexer::{Lexer, LexerError, LexerErrorKind};
pub use lookahead::{Lookahead, DEFAULT_CAPACITY};
pub use parser::{EntryPoint, ErrorCategory, InternalError, ParseStats, Parser, ParserError};

/// Parses `text` as a complete program.
pub fn parse_str(text: &str) -> Result<crate::syntax::SyntaxNode, ParserError> {
    Parser::new(Lexer::new(Cursor::new(text))).parse()
}
