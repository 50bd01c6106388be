use std::io;

use tinyc::parse::{Cursor, ErrorCategory, Lexer, Parser};
use tinyc::source::SourceId;
use tinyc::syntax::SyntaxNode;
use tracing::debug;

use super::config::OutputKind;
use super::dump::{dump_syntax_tree, dump_tokens};
use super::{Flow, RunnerCtx};

pub fn load_files(ctx: &mut RunnerCtx<'_, '_>) -> Flow<()> {
    for path in &ctx.config.paths {
        if let Err(e) = ctx.source.borrow_mut().load(path.clone()) {
            ctx.diagnostics
                .error()
                .with_message(format!("could not load file {}", path.display()))
                .with_source(Box::new(e))
                .emit();
        }
    }

    ctx.proceed(())
}

pub fn scan_files<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
) -> Flow<Vec<(SourceId, Lexer<'buf>)>> {
    let lexers = ctx
        .source
        .borrow()
        .iter()
        .map(|src_file| (src_file.id(), Lexer::new(Cursor::from_source_file(src_file))))
        .collect();

    Flow::Continue(lexers)
}

pub fn dump_tokens_if_asked<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    mut lexers: Vec<(SourceId, Lexer<'buf>)>,
) -> Flow<Vec<(SourceId, Lexer<'buf>)>> {
    let OutputKind::Lexer(format) = ctx.config.output else {
        return Flow::Continue(lexers);
    };

    for (src_id, lexer) in lexers.drain(..) {
        if let Err(e) = dump_tokens(format, lexer, io::stdout().lock()) {
            ctx.diagnostics
                .error()
                .in_file(src_id)
                .with_message("could not dump the tokens to stdout".to_owned())
                .with_source(Box::new(e))
                .emit();
        }
    }

    Flow::Stop
}

pub fn parse_all<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    mut lexers: Vec<(SourceId, Lexer<'buf>)>,
) -> Flow<Vec<(SourceId, SyntaxNode)>> {
    let mut result = Vec::with_capacity(lexers.len());

    for (src_id, lexer) in lexers.drain(..) {
        let parser = Parser::new(lexer);

        match parser.parse_with_stats(ctx.config.entry) {
            Ok((root, stats)) => {
                debug!(?src_id, max_lookahead = stats.max_lookahead, "parsed a file");
                result.push((src_id, root));
            }

            Err(e) => {
                let span = e.location().map(|span| span.into_owned());

                let builder = match e.category() {
                    ErrorCategory::Internal => ctx.diagnostics.bug(),
                    ErrorCategory::Lexical | ErrorCategory::Syntax => ctx.diagnostics.error(),
                };

                builder.in_file(src_id).with_span_and_error(span, e).emit();
            }
        }
    }

    ctx.proceed(result)
}

pub fn dump_trees<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    trees: Vec<(SourceId, SyntaxNode)>,
) -> Flow<()> {
    let format = match ctx.config.output {
        OutputKind::Parser(format) => format,
        OutputKind::Lexer(_) => return Flow::Stop,
    };

    for (src_id, root) in &trees {
        if let Err(e) = dump_syntax_tree(format, root, io::stdout().lock()) {
            ctx.diagnostics
                .error()
                .in_file(*src_id)
                .with_message("could not dump a syntax tree to stdout".to_owned())
                .with_source(Box::new(e))
                .emit();
        }
    }

    ctx.proceed(())
}
