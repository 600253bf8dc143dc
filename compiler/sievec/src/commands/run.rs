//! The `run` command: inspect every packet of a capture.
//!
//! Packets are read in batches. Each batch is parsed in parallel against the
//! shared compiled parser, then verdicts are applied in capture order.

use rayon::prelude::*;
use sieve_diagnostic::LevelDirective;
use sieve_ir::ByteStream;
use sieve_packet::{CaptureStats, Packet, PacketError, PacketSource, PcapSource, Verdict};
use sieve_parse::{drive, CompiledParser, ParseContext, StepOutcome};

use super::{load_grammar, parser_or_exit, CommonOptions, LoggingActions};

/// Options of the `run` command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunConfig {
    /// Payload offset the grammar starts at, e.g. past link and IP headers.
    pub offset: usize,
    /// Packets parsed in parallel per batch.
    pub batch: usize,
    pub verbose: bool,
    /// Entry point to use; the grammar's first parser when unset.
    pub parser: Option<String>,
    pub log_levels: Vec<LevelDirective>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            offset: 0,
            batch: 64,
            verbose: false,
            parser: None,
            log_levels: Vec::new(),
        }
    }
}

/// Parse `run` options (everything after the two positional paths).
pub fn parse_run_options(args: &[String]) -> Result<RunConfig, String> {
    let mut config = RunConfig::default();
    let mut common = CommonOptions::default();
    for arg in args {
        if let Some(value) = arg.strip_prefix("--offset=") {
            config.offset = value
                .parse()
                .map_err(|_| format!("invalid offset '{value}'"))?;
        } else if let Some(value) = arg.strip_prefix("--batch=") {
            config.batch = match value.parse() {
                Ok(0) | Err(_) => return Err(format!("invalid batch size '{value}'")),
                Ok(n) => n,
            };
        } else if arg == "--verbose" || arg == "-v" {
            config.verbose = true;
        } else if !common.accept(arg)? {
            return Err(format!("unknown option '{arg}'"));
        }
    }
    config.parser = common.parser;
    config.log_levels = common.log_levels;
    Ok(config)
}

/// Totals of a `run`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub packets: u64,
    pub accepted: u64,
    pub dropped: u64,
    pub truncated: u64,
}

impl From<CaptureStats> for RunSummary {
    fn from(stats: CaptureStats) -> Self {
        RunSummary {
            packets: stats.received,
            accepted: stats.accepted,
            dropped: stats.dropped,
            truncated: stats.truncated,
        }
    }
}

/// Parse one payload from `offset` and decide its verdict.
///
/// The payload is complete, so a parse that still waits for data is treated
/// as failed.
pub fn inspect(parser: &CompiledParser, payload: &[u8], offset: usize) -> (Verdict, ParseContext) {
    let stream = ByteStream::complete(payload.to_vec());
    let mut ctx = ParseContext::starting_at(parser, offset);
    let verdict = match drive(parser, &mut ctx, &stream, &LoggingActions) {
        StepOutcome::Finished => Verdict::Accept,
        StepOutcome::Failed | StepOutcome::Continue | StepOutcome::Suspended(_) => Verdict::Drop,
    };
    (verdict, ctx)
}

/// Inspect every packet of `source`, applying verdicts in order.
pub fn run_packets<S>(
    parser: &CompiledParser,
    source: &mut S,
    config: &RunConfig,
) -> Result<RunSummary, PacketError>
where
    S: PacketSource + ?Sized,
{
    let batch_size = config.batch.max(1);
    let mut batch: Vec<Packet> = Vec::with_capacity(batch_size);
    loop {
        batch.clear();
        while batch.len() < batch_size {
            match source.receive()? {
                Some(packet) => batch.push(packet),
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }

        let verdicts: Vec<(Verdict, usize)> = batch
            .par_iter()
            .map(|packet| {
                let (verdict, ctx) = inspect(parser, &packet.data, config.offset);
                (verdict, ctx.records().len())
            })
            .collect();

        for (packet, (verdict, fields)) in batch.drain(..).zip(verdicts) {
            if config.verbose {
                println!("packet {}: {verdict} ({fields} fields)", packet.id);
            }
            source.verdict(packet, verdict);
        }
    }
    Ok(source.stats().into())
}

/// Run a pcap capture through the grammar at `grammar_path`.
pub fn run_capture(grammar_path: &str, capture_path: &str, config: &RunConfig) {
    let grammar = load_grammar(grammar_path);
    let parser = parser_or_exit(&grammar, config.parser.as_deref());
    let mut source = match PcapSource::open(capture_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    match run_packets(parser, &mut source, config) {
        Ok(summary) => {
            println!(
                "{capture_path}: {} packets, {} accepted, {} dropped, {} truncated",
                summary.packets, summary.accepted, summary.dropped, summary.truncated
            );
        }
        Err(e) => {
            eprintln!("error: {capture_path}: {e}");
            std::process::exit(1);
        }
    }
}
