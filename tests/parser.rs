mod common;

use std::thread;

use paste::paste;
use pretty_assertions::{assert_eq, assert_str_eq};

use tinyc::parse::{
    parse_str, Cursor, EntryPoint, ErrorCategory, Lexer, Parser, ParserError,
};
use tinyc::syntax::dump::dump_tree_to_string;
use tinyc::syntax::{SyntaxKind, SyntaxNode};

use self::common::{parse, parse_as, program, Dump};

macro_rules! run_parser_test {
    ($filename:expr) => ({
        let code = include_str!(concat!("parser/", $filename, ".tiny"));

        let actual = Dump::from(match parse(code) {
            Ok(root) => dump_tree_to_string(&root),
            Err(e) => format!("ERR {}\n", e),
        });

        let expected = Dump::from(
            include_bytes!(concat!("parser/", $filename, ".tree")).as_slice()
        );

        assert_str_eq!(actual, expected);
    });

    { $( $filename:ident ),+ $(,)? } => {
        $(
            paste! {
                #[test]
                fn [< test_ $filename >]() {
                    run_parser_test!(concat!(stringify!($filename)));
                }
            }
        )+
    };
}

run_parser_test! {
    pass_minimal,
    pass_declarations,
    pass_statements,
    pass_function,
    pass_expressions,
    pass_null_statements,
    fail_missing_dot,
    fail_bare_identifier,
    fail_unterminated_string,
    fail_bad_primary,
    fail_trailing_input,
    fail_unrecognized_character,
}

const VALID_PROGRAMS: &[&str] = &[
    include_str!("parser/pass_minimal.tiny"),
    include_str!("parser/pass_declarations.tiny"),
    include_str!("parser/pass_statements.tiny"),
    include_str!("parser/pass_function.tiny"),
    include_str!("parser/pass_expressions.tiny"),
    include_str!("parser/pass_null_statements.tiny"),
];

fn statement(text: &str) -> SyntaxNode {
    parse_as(text, EntryPoint::Statement).unwrap()
}

fn leaf_texts(node: &SyntaxNode) -> Vec<(SyntaxKind, &str)> {
    node.children()
        .iter()
        .map(|child| {
            let token = child.token().expect("the child should be a leaf");

            (token.kind, token.text.as_str())
        })
        .collect()
}

#[test]
fn test_empty_program() {
    let root = parse("program t: begin end t.").unwrap();

    insta::assert_snapshot!(dump_tree_to_string(&root), @r###"
    program(7)
    . <identifier>(1)
    . . t(0)
    . consts(0)
    . types(0)
    . dclns(0)
    . subprogs(0)
    . block(0)
    . <identifier>(1)
    . . t(0)
    "###);

    assert_eq!(root.kind(), SyntaxKind::Program);
    assert_eq!(root.children().len(), 7);

    for idx in 1..=5 {
        assert!(root.child(idx).unwrap().children().is_empty());
    }
}

#[test]
fn test_assignment_statement() {
    let node = statement("x:=1");

    assert_eq!(node.kind(), SyntaxKind::Assign);
    assert_eq!(
        leaf_texts(&node),
        vec![(SyntaxKind::Identifier, "x"), (SyntaxKind::Integer, "1")]
    );
}

#[test]
fn test_swap_statement() {
    let node = statement("x:=:y");

    assert_eq!(node.kind(), SyntaxKind::Swap);
    assert_eq!(
        leaf_texts(&node),
        vec![(SyntaxKind::Identifier, "x"), (SyntaxKind::Identifier, "y")]
    );
}

#[test]
fn test_if_with_and_without_else() {
    let with_else = statement("if a then x := 1 else x := 2");
    assert_eq!(with_else.kind(), SyntaxKind::If);
    assert_eq!(with_else.children().len(), 3);

    let without_else = statement("if a then x := 1");
    assert_eq!(without_else.kind(), SyntaxKind::If);
    assert_eq!(without_else.children().len(), 2);
}

#[test]
fn test_dangling_else_binds_to_the_inner_if() {
    let node = statement("if a then if b then x := 1 else x := 2");

    assert_eq!(node.children().len(), 2);

    let inner = node.child(1).unwrap();
    assert_eq!(inner.kind(), SyntaxKind::If);
    assert_eq!(inner.children().len(), 3);
}

#[test]
fn test_bare_identifier_is_not_a_statement() {
    let Err(ParserError::UnexpectedToken { expected, actual }) =
        parse_as("if a then b else c", EntryPoint::Statement)
    else {
        panic!("a bare identifier should not parse as a statement");
    };

    assert_eq!(actual.text, "b");
    assert_eq!(&*expected, &[SyntaxKind::EndOfFile]);
}

#[test]
fn test_empty_statement() {
    let node = statement("");

    assert_eq!(node.kind(), SyntaxKind::Null);
    assert!(node.children().is_empty());
}

#[test]
fn test_expression_entry_point() {
    let root = parse_as("a * (b + 1) >= -c", EntryPoint::Expression).unwrap();

    assert_eq!(
        dump_tree_to_string(&root),
        "\
>=(2)
. *(2)
. . <identifier>(1)
. . . a(0)
. . +(2)
. . . <identifier>(1)
. . . . b(0)
. . . <integer>(1)
. . . . 1(0)
. -(1)
. . <identifier>(1)
. . . c(0)
"
    );
}

#[test]
fn test_relational_operators_do_not_chain() {
    let error = parse_as("a < b < c", EntryPoint::Expression).unwrap_err();

    assert_eq!(error.category(), ErrorCategory::Syntax);
}

#[test]
fn test_call_without_arguments_is_rejected() {
    let error = parse_as("f()", EntryPoint::Expression).unwrap_err();

    let ParserError::UnexpectedToken { actual, .. } = error else {
        panic!("expected a syntax error");
    };

    assert_eq!(actual.kind, SyntaxKind::ParenRight);
}

#[test]
fn test_parse_is_deterministic() {
    for source in VALID_PROGRAMS {
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }
}

#[test]
fn test_parse_str_matches_parser() {
    for source in VALID_PROGRAMS {
        assert_eq!(parse_str(source).unwrap(), parse(source).unwrap());
    }
}

#[test]
fn test_arity_law() {
    for source in VALID_PROGRAMS {
        let root = parse(source).unwrap();

        for node in root.descendants() {
            let SyntaxNode::Tree(tree) = node else {
                continue;
            };

            assert!(tree.kind().is_node(), "{:?} is not a node kind", tree.kind());
            let arity = tree.kind().arity().expect("a tree has a node kind");

            assert!(
                arity.admits(tree.len()),
                "`{}` has {} children but admits {}",
                tree.kind(),
                tree.len(),
                arity
            );
        }
    }
}

#[test]
fn test_leaves_are_literals() {
    for source in VALID_PROGRAMS {
        let root = parse(source).unwrap();

        for node in root.descendants() {
            if let SyntaxNode::Leaf(leaf) = node {
                assert!(leaf.kind().is_literal(), "{:?} is not a literal", leaf.kind());
            }
        }
    }
}

#[test]
fn test_lookahead_bound() {
    for source in VALID_PROGRAMS {
        let parser = Parser::new(Lexer::new(Cursor::new(source)));
        let (_, stats) = parser.parse_with_stats(EntryPoint::Program).unwrap();

        assert!(stats.max_lookahead < 2);
    }
}

#[test]
fn test_leaves_keep_their_trivia() {
    let root = parse("program t:\nbegin\n    x := 1 # one\nend t.\n").unwrap();

    let one = root
        .descendants()
        .filter_map(SyntaxNode::token)
        .find(|token| token.kind == SyntaxKind::Integer)
        .unwrap();

    assert_eq!(one.full_text(), "1 # one\n");
}

#[test]
fn test_error_location() {
    let error = parse(&program("x")).unwrap_err();
    let span = error.location().unwrap();

    assert_eq!(error.category(), ErrorCategory::Syntax);
    assert_eq!((span.start.line, span.start.col), (1, 18));
}

#[test]
fn test_lexical_error_category() {
    let error = parse(&program("x := 'ab'")).unwrap_err();

    assert_eq!(error.category(), ErrorCategory::Lexical);
    assert!(std::error::Error::source(&error).is_some());
}

/// Runs `f` on a thread whose stack fits a parse nested up to the recursion limit, which takes
/// more than the default in a debug build.
fn on_large_stack<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

fn nested_parens(depth: usize) -> String {
    format!("{}x{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_recursion_limit() {
    let source = nested_parens(500);
    let result = on_large_stack(move || parse_as(&source, EntryPoint::Expression));

    assert!(matches!(result, Err(ParserError::RecursionLimit(_))));
}

#[test]
fn test_deep_nesting_is_accepted() {
    for depth in [10, 60, 150] {
        let source = nested_parens(depth);
        let root = on_large_stack(move || parse_as(&source, EntryPoint::Expression)).unwrap();

        assert_eq!(root.kind(), SyntaxKind::Identifier);
    }
}

#[test]
fn test_deep_statement_nesting_is_accepted() {
    let depth = 60;
    let source = program(&format!(
        "{}x := 1{}",
        "begin ".repeat(depth),
        " end".repeat(depth)
    ));

    let root = on_large_stack(move || parse(&source)).unwrap();

    assert_eq!(root.kind(), SyntaxKind::Program);
}

#[test]
fn test_list_error_expects_separator_or_terminator() {
    let error = parse(&program("x := 1 y := 2")).unwrap_err();

    let ParserError::UnexpectedToken { expected, actual } = error else {
        panic!("expected a syntax error");
    };

    assert_eq!(&*expected, &[SyntaxKind::Semicolon, SyntaxKind::EndKw]);
    assert_eq!(actual.text, "y");
}
