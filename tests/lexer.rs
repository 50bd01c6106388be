mod common;

use pretty_assertions::assert_eq;

use tinyc::parse::{Cursor, Lexer, LexerErrorKind};
use tinyc::position::HasSpan;
use tinyc::syntax::{SyntaxKind, Trivia};

use self::common::tokenize;

fn kinds(text: &str) -> Vec<SyntaxKind> {
    tokenize(text).into_iter().map(|token| token.kind).collect()
}

fn first_error(text: &str) -> tinyc::parse::LexerError {
    Lexer::new(Cursor::new(text))
        .find_map(Result::err)
        .expect("the input should fail to scan")
}

#[test]
fn test_block_comment_is_leading_trivia() {
    let tokens = tokenize("{ comment } x");

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, SyntaxKind::Identifier);
    assert_eq!(tokens[0].text, "x");
    assert_eq!(
        tokens[0].leading_trivia,
        vec![
            Trivia::new(SyntaxKind::BlockComment, "{ comment }"),
            Trivia::new(SyntaxKind::Whitespace, " "),
        ]
    );
    assert!(tokens[0].trailing_trivia.is_empty());
    assert!(tokens[1].is_eof());
}

#[test]
fn test_trailing_trivia_stops_after_line_break() {
    let tokens = tokenize("x # note\n  y");

    assert_eq!(
        tokens[0].trailing_trivia,
        vec![
            Trivia::new(SyntaxKind::Whitespace, " "),
            Trivia::new(SyntaxKind::LineComment, "# note"),
            Trivia::new(SyntaxKind::EndOfLine, "\n"),
        ]
    );
    assert_eq!(
        tokens[1].leading_trivia,
        vec![Trivia::new(SyntaxKind::Whitespace, "  ")]
    );
}

#[test]
fn test_eof_carries_final_trivia() {
    let tokens = tokenize("x\n\n# end");
    let eof = tokens.last().unwrap();

    assert!(eof.is_eof());
    assert_eq!(eof.text, "");
    assert_eq!(
        eof.leading_trivia,
        vec![
            Trivia::new(SyntaxKind::EndOfLine, "\n"),
            Trivia::new(SyntaxKind::LineComment, "# end"),
        ]
    );
}

#[test]
fn test_trivia_round_trip() {
    let sources = [
        "",
        "   ",
        "program t:\n  { header }\nbegin\r\n  x := 1; # set x\r\n  output(x)\nend t.\n",
        "{ a }{ b }\t\n\n  # trailing comment without a newline",
        "\"multi\nline\" 'c'\r\r\n",
    ];

    for source in sources {
        let rebuilt: String = tokenize(source).iter().map(|token| token.full_text()).collect();

        assert_eq!(rebuilt, source);
    }
}

#[test]
fn test_punctuation() {
    use SyntaxKind::*;

    assert_eq!(
        kinds(":=: := <= <> < >= > .. . : , + - * / = ( ) ;"),
        vec![
            ColonEqColon, ColonEq, LessEq, LessGreater, Less, GreaterEq, Greater, DotDot, Dot,
            Colon, Comma, Plus, Minus, Asterisk, Slash, Eq, ParenLeft, ParenRight, Semicolon,
            EndOfFile,
        ]
    );
}

#[test]
fn test_token_kinds_fall_into_one_class() {
    let text = "program p: var x, y: integer; begin x := 'a'; output(\"s\", x <= 3) end p.";

    for kind in kinds(text) {
        let classes = [kind.is_keyword(), kind.is_punctuation(), kind.is_literal()];

        assert_eq!(classes.iter().filter(|&&class| class).count(), 1, "{:?}", kind);
        assert!(!kind.is_trivia() && !kind.is_node(), "{:?}", kind);
        assert_eq!(kind.is_punctuation(), kind.lexeme().is_some() && !kind.is_keyword());
    }
}

#[test]
fn test_punctuation_without_spaces() {
    use SyntaxKind::*;

    assert_eq!(
        kinds("x:=:y;a:=1..2"),
        vec![
            Identifier, ColonEqColon, Identifier, Semicolon, Identifier, ColonEq, Integer,
            DotDot, Integer, EndOfFile,
        ]
    );
}

#[test]
fn test_keywords_are_case_sensitive() {
    use SyntaxKind::*;

    assert_eq!(
        kinds("program Program programme _x1 eof pool"),
        vec![ProgramKw, Identifier, Identifier, Identifier, EofKw, PoolKw, EndOfFile]
    );
}

#[test]
fn test_every_keyword_round_trips_through_the_table() {
    for text in [
        "program", "var", "const", "type", "function", "return", "begin", "end", "output", "if",
        "then", "else", "while", "do", "case", "of", "otherwise", "repeat", "for", "until",
        "loop", "pool", "exit", "mod", "and", "or", "not", "read", "succ", "pred", "chr", "ord",
        "eof",
    ] {
        let kind = SyntaxKind::keyword(text).unwrap();

        assert!(kind.is_keyword());
        assert_eq!(kind.lexeme(), Some(text));
        assert_eq!(kinds(text), vec![kind, SyntaxKind::EndOfFile]);
    }
}

#[test]
fn test_literals() {
    let tokens = tokenize("42 'a' \"hello, world\" x_9");

    let summary: Vec<_> = tokens
        .iter()
        .map(|token| (token.kind, token.text.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (SyntaxKind::Integer, "42"),
            (SyntaxKind::Char, "'a'"),
            (SyntaxKind::String, "\"hello, world\""),
            (SyntaxKind::Identifier, "x_9"),
            (SyntaxKind::EndOfFile, ""),
        ]
    );
}

#[test]
fn test_string_may_span_lines() {
    let tokens = tokenize("\"a\nb\" x");

    assert_eq!(tokens[0].kind, SyntaxKind::String);
    assert_eq!(tokens[0].text, "\"a\nb\"");
    assert_eq!(tokens[1].span.start.line, 2);
    assert_eq!(tokens[1].span.start.col, 4);
}

#[test]
fn test_positions() {
    let tokens = tokenize("a\n  bc\r\nd");

    let starts: Vec<_> = tokens
        .iter()
        .map(|token| (token.span.start.line, token.span.start.col, token.span.start.byte))
        .collect();

    assert_eq!(starts, vec![(1, 1, 0), (2, 3, 4), (3, 1, 8), (3, 2, 9)]);
    assert_eq!(tokens[1].span.end.col, 5);
}

#[test]
fn test_unterminated_string() {
    let results: Vec<_> = Lexer::new(Cursor::new("x := \"abc")).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().kind, SyntaxKind::Identifier);
    assert_eq!(results[1].as_ref().unwrap().kind, SyntaxKind::ColonEq);

    let error = results[2].as_ref().unwrap_err();
    assert_eq!(error.kind(), LexerErrorKind::UnterminatedString);
    assert_eq!(error.span().start.col, 6);
}

#[test]
fn test_error_is_sticky() {
    let mut lexer = Lexer::new(Cursor::new("@ x"));

    let first = lexer.next_token().unwrap_err();
    let second = lexer.next_token().unwrap_err();

    assert_eq!(first.kind(), LexerErrorKind::UnrecognizedCharacter('@'));
    assert_eq!(first, second);
}

#[test]
fn test_lexical_errors() {
    assert_eq!(
        first_error("x ? y").kind(),
        LexerErrorKind::UnrecognizedCharacter('?')
    );
    assert_eq!(first_error("'ab'").kind(), LexerErrorKind::MalformedChar);
    assert_eq!(first_error("'a").kind(), LexerErrorKind::MalformedChar);
    assert_eq!(first_error("'\n'").kind(), LexerErrorKind::MalformedChar);
    assert_eq!(
        first_error("begin { never closed").kind(),
        LexerErrorKind::UnterminatedComment
    );
}

#[test]
fn test_iterator_stops_after_eof() {
    let mut lexer = Lexer::new(Cursor::new("x"));

    assert_eq!(lexer.next().unwrap().unwrap().kind, SyntaxKind::Identifier);
    assert!(lexer.next().unwrap().unwrap().is_eof());
    assert!(lexer.next().is_none());
    assert!(lexer.next().is_none());
}

#[test]
fn test_next_token_after_eof() {
    let mut lexer = Lexer::new(Cursor::new("  "));

    let eof = lexer.next_token().unwrap();
    assert!(eof.is_eof());
    assert_eq!(eof.leading_trivia.len(), 1);

    let again = lexer.next_token().unwrap();
    assert!(again.is_eof());
    assert!(again.leading_trivia.is_empty());
}
