//! Command handlers for the `sieve` CLI.
//!
//! Grammar loading, option parsing and the action handler shared by every
//! command live in the module root.

use sieve_diagnostic::{emit, log, parse_directives, LevelDirective, LogLevel};
use sieve_ir::{GrammarError, GrammarFile};
use sieve_parse::{
    compile_unit, ActionHandler, ActionRequest, ActionResult, CompileError, CompiledGrammar,
    CompiledParser, ParseContext,
};

mod compile;
mod parse;
mod run;

pub use compile::compile_file;
pub use parse::parse_file;
pub use run::{inspect, parse_run_options, run_capture, run_packets, RunConfig, RunSummary};

/// Log section used for external action traces.
pub const ACTION_SECTION: &str = "action";

/// Why a grammar description could not be turned into parsers.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid grammar description: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("grammar '{grammar}' has no parser '{name}' (available: {available})")]
    UnknownParser {
        grammar: String,
        name: String,
        available: String,
    },
}

/// Deserialize, lower and compile every parser of a JSON grammar description.
pub fn load_grammar_str(json: &str) -> Result<CompiledGrammar, LoadError> {
    let file: GrammarFile = serde_json::from_str(json)?;
    let grammars = file.to_grammars()?;
    Ok(compile_unit(&file.name, &grammars)?)
}

/// The parser called `name`, or the grammar's first parser.
pub fn select_parser<'a>(
    grammar: &'a CompiledGrammar,
    name: Option<&str>,
) -> Result<&'a CompiledParser, LoadError> {
    grammar.select(name).ok_or_else(|| LoadError::UnknownParser {
        grammar: grammar.name().to_string(),
        name: name.unwrap_or_default().to_string(),
        available: grammar.names().collect::<Vec<_>>().join(", "),
    })
}

/// Load the grammar at `path`, exiting with a message on failure.
pub(super) fn load_grammar(path: &str) -> CompiledGrammar {
    let json = read_file(path);
    match load_grammar_str(&json) {
        Ok(grammar) => {
            tracing::debug!(
                grammar = grammar.name(),
                parsers = grammar.parsers().len(),
                "grammar loaded"
            );
            grammar
        }
        Err(e) => {
            eprintln!("error: {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Pick a parser of `grammar`, exiting with a message on failure.
pub(super) fn parser_or_exit<'a>(
    grammar: &'a CompiledGrammar,
    name: Option<&str>,
) -> &'a CompiledParser {
    match select_parser(grammar, name) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Options accepted by `compile` and `parse`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommonOptions {
    /// Entry point to use; the grammar's first parser when unset.
    pub parser: Option<String>,
    pub log_levels: Vec<LevelDirective>,
}

impl CommonOptions {
    /// Consume `arg` if it is a common option.
    fn accept(&mut self, arg: &str) -> Result<bool, String> {
        if let Some(value) = arg.strip_prefix("--parser=") {
            if value.is_empty() {
                return Err("empty parser name".to_string());
            }
            self.parser = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--loglevel=") {
            self.log_levels
                .extend(parse_directives(value).map_err(|e| format!("{e}"))?);
        } else {
            return Ok(false);
        }
        Ok(true)
    }
}

/// Parse the trailing options of `compile` and `parse`.
pub fn parse_common_options(args: &[String]) -> Result<CommonOptions, String> {
    let mut options = CommonOptions::default();
    for arg in args {
        if !options.accept(arg)? {
            return Err(format!("unknown option '{arg}'"));
        }
    }
    Ok(options)
}

/// Read a file to a string, exiting with a message on failure.
pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}", read_error(path, &e));
            std::process::exit(1);
        }
    }
}

/// Read a binary file, exiting with a message on failure.
pub(super) fn read_bytes(path: &str) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}", read_error(path, &e));
            std::process::exit(1);
        }
    }
}

fn read_error(path: &str, e: &std::io::Error) -> String {
    match e.kind() {
        std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
        std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
        std::io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
        _ => format!("error reading '{path}': {e}"),
    }
}

/// Accepts every request and logs it at info level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LoggingActions;

impl ActionHandler for LoggingActions {
    fn invoke(
        &self,
        parser: &CompiledParser,
        request: &ActionRequest,
        _ctx: &ParseContext,
    ) -> ActionResult {
        if log::enabled(LogLevel::Info, ACTION_SECTION) {
            let field = parser
                .debug_info(request.node)
                .map_or("<unknown>", |info| info.field.as_str());
            emit(
                LogLevel::Info,
                ACTION_SECTION,
                &format!(
                    "{} on {field} at byte {}: {}",
                    parser.action_name(request.action).unwrap_or("<unknown>"),
                    request.position,
                    request.value
                ),
            );
        }
        ActionResult::Accept
    }
}
