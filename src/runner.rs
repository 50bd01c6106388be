use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

use tinyc::errors::{Diagnostic, Diagnostics};
use tinyc::source::{Source, SourceBuffer};

use self::config::{parse_args_or_exit, TinycConfig};
use self::errors::print_diagnostic;

pub mod config;
mod dump;
mod errors;
mod passes;

/// What a pass tells the driver: go on with its output, or end the run here.
pub enum Flow<O> {
    Continue(O),
    Stop,
}

pub struct RunnerCtx<'buf, 'emt> {
    pub config: TinycConfig,
    pub source: Rc<RefCell<Source<'buf>>>,
    pub diagnostics: Diagnostics<'emt>,
}

impl RunnerCtx<'_, '_> {
    /// Continues with `output` unless an error has been reported so far.
    pub fn proceed<O>(&self, output: O) -> Flow<O> {
        if self.diagnostics.has_errors() {
            Flow::Stop
        } else {
            Flow::Continue(output)
        }
    }

    fn exit_code(&self) -> ExitCode {
        if self.diagnostics.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

macro_rules! return_if_stopped {
    ($ctx:expr, $e:expr) => {
        match $e {
            Flow::Continue(output) => output,
            Flow::Stop => return $ctx.exit_code(),
        }
    };
}

fn run(mut ctx: RunnerCtx<'_, '_>) -> ExitCode {
    return_if_stopped!(ctx, passes::load_files(&mut ctx));

    // lexical analysis
    let lexers = return_if_stopped!(ctx, passes::scan_files(&mut ctx));
    let lexers = return_if_stopped!(ctx, passes::dump_tokens_if_asked(&mut ctx, lexers));

    // syntax analysis
    let trees = return_if_stopped!(ctx, passes::parse_all(&mut ctx, lexers));
    return_if_stopped!(ctx, passes::dump_trees(&mut ctx, trees));

    ctx.exit_code()
}

pub fn prepare_and_run() -> ExitCode {
    let config = parse_args_or_exit();
    let mut source_buf = SourceBuffer::new();
    let source = Rc::new(RefCell::new(Source::new(&mut source_buf)));

    let mut diagnostics = Diagnostics::new();

    diagnostics.set_emitter({
        let source = source.clone();

        Box::new(move |diagnostic: &Diagnostic| {
            print_diagnostic(&source.borrow(), diagnostic);
        })
    });

    run(RunnerCtx {
        config,
        source,
        diagnostics,
    })
}
