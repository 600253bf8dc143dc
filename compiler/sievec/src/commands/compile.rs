//! The `compile` command: compile a grammar and print its debug tables.

use super::{load_grammar, parser_or_exit};

/// Print the table of `parser`, or of every parser the grammar exports.
pub fn compile_file(path: &str, parser: Option<&str>) {
    let grammar = load_grammar(path);
    if parser.is_some() {
        let parser = parser_or_exit(&grammar, parser);
        print!("{}", parser.dump_table());
        println!();
        println!("OK: {} ({} nodes)", parser.name(), parser.len());
        return;
    }
    print!("{}", grammar.dump_tables());
    println!();
    println!(
        "OK: {} ({} parsers: {})",
        grammar.name(),
        grammar.parsers().len(),
        grammar.names().collect::<Vec<_>>().join(", ")
    );
}
