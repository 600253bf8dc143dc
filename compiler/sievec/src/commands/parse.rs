//! The `parse` command: parse one binary file against a grammar.

use sieve_diagnostic::format_parse_error;
use sieve_ir::ByteStream;
use sieve_parse::{drive, ParseContext, StepOutcome};

use super::{load_grammar, parser_or_exit, read_bytes, LoggingActions};

/// Parse `input_path` as a complete message with the parser called `parser`
/// (the grammar's first one by default). Exits with status 1 on failure.
pub fn parse_file(grammar_path: &str, input_path: &str, parser: Option<&str>) {
    let grammar = load_grammar(grammar_path);
    let parser = parser_or_exit(&grammar, parser);
    let stream = ByteStream::complete(read_bytes(input_path));
    let mut ctx = ParseContext::new(parser);

    let outcome = drive(parser, &mut ctx, &stream, &LoggingActions);

    for record in ctx.records() {
        let field = parser
            .debug_info(record.node)
            .map_or("<unknown>", |info| info.field.as_str());
        println!("{:>6}  {field} = {}", record.position, record.value);
    }

    match outcome {
        StepOutcome::Finished => {
            let trailing = stream.available(ctx.cursor());
            if trailing > 0 {
                println!("OK: {input_path} ({} bytes, {trailing} unparsed)", stream.end());
            } else {
                println!("OK: {input_path} ({} bytes)", stream.end());
            }
        }
        StepOutcome::Failed => {
            if let Some(error) = ctx.error() {
                eprintln!("{}", format_parse_error(error, parser.debug_table(), &stream));
            }
            std::process::exit(1);
        }
        // A complete stream never waits for data and `drive` resolves every
        // suspension.
        StepOutcome::Continue | StepOutcome::Suspended(_) => {
            eprintln!("error: parse of {input_path} did not complete");
            std::process::exit(1);
        }
    }
}
