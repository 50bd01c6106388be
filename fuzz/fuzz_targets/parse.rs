#![no_main]

use libfuzzer_sys::fuzz_target;

use tinyc::parse::{Cursor, ErrorCategory, Lexer, Parser};
use tinyc::syntax::SyntaxNode;

fuzz_target!(|code: &str| {
    let tokens: Result<Vec<_>, _> = Lexer::new(Cursor::new(code)).collect();

    if let Ok(tokens) = tokens {
        let rebuilt: String = tokens.iter().map(|token| token.full_text()).collect();
        assert_eq!(rebuilt, code);
    }

    let root = match Parser::new(Lexer::new(Cursor::new(code))).parse() {
        Ok(root) => root,
        Err(e) => {
            assert_ne!(e.category(), ErrorCategory::Internal, "{}", e);

            return;
        }
    };

    for node in root.descendants() {
        if let SyntaxNode::Tree(tree) = node {
            let arity = tree.kind().arity().unwrap();
            assert!(arity.admits(tree.len()));
        }
    }
});
