use std::io::{self, Write};

use ron::ser::PrettyConfig;
use serde::Serialize;
use tinyc::parse::LexerError;
use tinyc::position::HasSpan;
use tinyc::syntax::dump::dump_tree;
use tinyc::syntax::{SyntaxNode, Token, Trivia};

use super::config::OutputFormat;

fn write_ron(value: &impl Serialize, mut out: impl Write) -> io::Result<()> {
    let text = ron::ser::to_string_pretty(value, PrettyConfig::default())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    writeln!(out, "{}", text)
}

pub fn dump_tokens<I>(format: OutputFormat, tokens: I, mut out: impl Write) -> io::Result<()>
where
    I: Iterator<Item = Result<Token, LexerError>>,
{
    match format {
        OutputFormat::Tiny => dump_tokens_tiny(tokens, out),
        OutputFormat::Debug => writeln!(out, "{:#?}", tokens.collect::<Vec<_>>()),
        OutputFormat::Ron => write_ron(&tokens.collect::<Vec<_>>(), out),
    }
}

fn write_trivia(trivia: &[Trivia], out: &mut impl Write) -> io::Result<()> {
    for Trivia { kind, text } in trivia {
        writeln!(out, "    {} {:?}", kind, text)?;
    }

    Ok(())
}

fn dump_tokens_tiny<I>(tokens: I, mut out: impl Write) -> io::Result<()>
where
    I: Iterator<Item = Result<Token, LexerError>>,
{
    for token in tokens {
        let token = match token {
            Ok(token) => token,

            Err(e) => {
                writeln!(out, "{} ERROR {}", e.span().start, e)?;

                continue;
            }
        };

        write_trivia(&token.leading_trivia, &mut out)?;
        writeln!(out, "{} {} {:?}", token.span.start, token.kind, token.text)?;
        write_trivia(&token.trailing_trivia, &mut out)?;
    }

    Ok(())
}

pub fn dump_syntax_tree(
    format: OutputFormat,
    root: &SyntaxNode,
    mut out: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Tiny => dump_tree(root, out),
        OutputFormat::Debug => writeln!(out, "{:#?}", root),
        OutputFormat::Ron => write_ron(root, out),
    }
}
