//! Sieve CLI
//!
//! Grammar-driven binary message and packet inspection.

use sieve_diagnostic::init_logging;
use sievec::commands::{
    compile_file, parse_common_options, parse_file, parse_run_options, run_capture, CommonOptions,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "compile" => {
            if args.len() < 3 {
                eprintln!("Usage: sieve compile <grammar.json> [--parser=<name>]");
                std::process::exit(1);
            }
            let options = common_options(&args[3..]);
            init_logging(&options.log_levels);
            compile_file(&args[2], options.parser.as_deref());
        }
        "parse" => {
            if args.len() < 4 {
                eprintln!("Usage: sieve parse <grammar.json> <file> [--parser=<name>]");
                std::process::exit(1);
            }
            let options = common_options(&args[4..]);
            init_logging(&options.log_levels);
            parse_file(&args[2], &args[3], options.parser.as_deref());
        }
        "run" => {
            if args.len() < 4 {
                eprintln!("Usage: sieve run <grammar.json> <capture.pcap> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --offset=<n>        Payload byte the grammar starts at (default: 0)");
                eprintln!("  --batch=<n>         Packets parsed in parallel (default: 64)");
                eprintln!("  --parser=<name>     Entry point (default: the grammar's first parser)");
                eprintln!("  --loglevel=<list>   Levels, e.g. warn,grammar:debug (default: warn)");
                eprintln!("  -v, --verbose       Print every verdict");
                std::process::exit(1);
            }
            let config = match parse_run_options(&args[4..]) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            };
            init_logging(&config.log_levels);
            run_capture(&args[2], &args[3], &config);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("Sieve {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Options after the positional arguments, exiting on a bad one.
fn common_options(args: &[String]) -> CommonOptions {
    match parse_common_options(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Sieve (grammar-driven message inspection)");
    println!();
    println!("Usage: sieve <command> [options]");
    println!();
    println!("Commands:");
    println!("  compile <grammar.json>              Compile a grammar and print its node table");
    println!("  parse <grammar.json> <file>         Parse a binary file and print its fields");
    println!("  run <grammar.json> <capture.pcap>   Inspect every packet of a pcap capture");
    println!("  help                                Show this help message");
    println!("  version                             Show version information");
    println!();
    println!("Run options:");
    println!("  --offset=<n>        Payload byte the grammar starts at (default: 0)");
    println!("  --batch=<n>         Packets parsed in parallel (default: 64)");
    println!("  -v, --verbose       Print every verdict");
    println!();
    println!("Common options:");
    println!("  --parser=<name>     Entry point (default: the grammar's first parser)");
    println!("  --loglevel=<list>   Comma-separated levels: fatal, error, warn, info, debug,");
    println!("                      each optionally prefixed by a section, e.g.");
    println!("                      --loglevel=warn,grammar:debug (default: warn)");
    println!("                      RUST_LOG overrides this when set");
}
