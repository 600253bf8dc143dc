//! Grammar units: every parser one grammar exports.
//!
//! Each entry point is compiled on its own, so identifiers and debug tables
//! of sibling parsers are independent.

use std::fmt::Write as _;

use rustc_hash::FxHashSet;
use sieve_ir::Grammar;

use crate::compile::{compile, CompileError};
use crate::parser::CompiledParser;

/// The compiled parsers of one grammar unit, in declaration order.
#[derive(Clone, Debug)]
pub struct CompiledGrammar {
    name: String,
    parsers: Vec<CompiledParser>,
}

impl CompiledGrammar {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parsers(&self) -> &[CompiledParser] {
        &self.parsers
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parsers.iter().map(CompiledParser::name)
    }

    pub fn parser(&self, name: &str) -> Option<&CompiledParser> {
        self.parsers.iter().find(|parser| parser.name() == name)
    }

    /// The parser called `name`, or the first exported one without a name.
    pub fn select(&self, name: Option<&str>) -> Option<&CompiledParser> {
        match name {
            Some(name) => self.parser(name),
            None => self.parsers.first(),
        }
    }

    /// Debug tables of every parser, each under a `parser <name>` header.
    pub fn dump_tables(&self) -> String {
        let mut out = String::new();
        for (index, parser) in self.parsers.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "parser {}", parser.name());
            out.push_str(&parser.dump_table());
        }
        out
    }
}

/// Compile every grammar of the unit `name`.
///
/// Grammar names are the parser names and must be unique.
#[tracing::instrument(level = "debug", skip_all, fields(unit = name))]
pub fn compile_unit(name: &str, grammars: &[Grammar]) -> Result<CompiledGrammar, CompileError> {
    if grammars.is_empty() {
        return Err(CompileError::NoParsers(name.to_string()));
    }
    let mut seen = FxHashSet::default();
    let mut parsers = Vec::with_capacity(grammars.len());
    for grammar in grammars {
        if !seen.insert(grammar.name()) {
            return Err(CompileError::DuplicateParser {
                unit: name.to_string(),
                parser: grammar.name().to_string(),
            });
        }
        parsers.push(compile(grammar)?);
    }
    Ok(CompiledGrammar {
        name: name.to_string(),
        parsers,
    })
}
