//! Sieve command-line driver.
//!
//! ```text
//! grammar.json ──► GrammarFile ──► [Grammar] ──► compile_unit() ──► CompiledGrammar
//!                                                                       │ --parser=
//!                   packet / file bytes ──► ByteStream ──► drive(CompiledParser) ──► verdict
//! ```
//!
//! The binary in `main.rs` only parses arguments; every command lives in
//! [`commands`] so it can be exercised from tests.

pub mod commands;
