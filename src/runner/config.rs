use std::path::PathBuf;

use clap::{arg, command, value_parser, ValueEnum};
use tinyc::parse::EntryPoint;

#[derive(Debug, Clone)]
pub struct TinycConfig {
    pub paths: Vec<PathBuf>,
    pub output: OutputKind,
    pub entry: EntryPoint,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CompilationStage {
    Lexer,
    #[default]
    Parser,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// The indented tree listing, or one token per line.
    #[default]
    Tiny,
    Debug,
    Ron,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryArg {
    #[default]
    Program,
    Statement,
    Expression,
}

impl From<EntryArg> for EntryPoint {
    fn from(entry: EntryArg) -> EntryPoint {
        match entry {
            EntryArg::Program => EntryPoint::Program,
            EntryArg::Statement => EntryPoint::Statement,
            EntryArg::Expression => EntryPoint::Expression,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Lexer(OutputFormat),
    Parser(OutputFormat),
}

pub fn parse_args_or_exit() -> TinycConfig {
    use clap::Command;

    fn command() -> Command {
        command!()
            .arg(
                arg!(files: <FILE> ... "input files")
                    .value_parser(value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                arg!(-s --stage <STAGE> "the compilation stage to stop after")
                    .value_parser(value_parser!(CompilationStage))
                    .required(false),
            )
            .arg(
                arg!(-f --format <FORMAT> "the output format")
                    .value_parser(value_parser!(OutputFormat)),
            )
            .arg(
                arg!(-e --entry <ENTRY> "the production to start parsing from")
                    .value_parser(value_parser!(EntryArg)),
            )
    }

    fn parse_args() -> Result<TinycConfig, clap::Error> {
        use clap::error::ErrorKind;

        let mut command = command();
        let matches = command.get_matches_mut();

        let Some(paths) = matches.get_many::<PathBuf>("files") else {
            return Err(command.error(ErrorKind::MissingRequiredArgument, "no input files"));
        };

        let paths = paths.cloned().collect();
        let stage = matches
            .get_one::<CompilationStage>("stage")
            .copied()
            .unwrap_or_default();
        let format = matches
            .get_one::<OutputFormat>("format")
            .copied()
            .unwrap_or_default();
        let entry = matches.get_one::<EntryArg>("entry").copied();

        let output = match stage {
            CompilationStage::Lexer => OutputKind::Lexer(format),
            CompilationStage::Parser => OutputKind::Parser(format),
        };

        if stage == CompilationStage::Lexer && entry.is_some() {
            return Err(command.error(
                ErrorKind::ArgumentConflict,
                "an entry point only applies to the parser stage",
            ));
        }

        Ok(TinycConfig {
            paths,
            output,
            entry: entry.unwrap_or_default().into(),
        })
    }

    match parse_args() {
        Ok(cfg) => cfg,

        Err(e) => {
            e.format(&mut command()).exit();
        }
    }
}
