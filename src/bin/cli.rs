//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
//! CLI running one lazy / eager / prefetch page-touch benchmark.
//!
//! Examples:
//! ```bash
//! pagetouch lazy                          # 10M elements, every 1000th touched
//! pagetouch init                          # same as `eager`
//! pagetouch prefetch -n 100000 -s 1       # second-variant shape: every element
//! pagetouch eager --fill-byte 0xff -q     # only Time / Pagefaults lines
//! PAGETOUCH_ELEMENTS=50000000 pagetouch lazy -v
//! ```
//!
//! Exit codes: 0 success, 2 invalid argument, 3 allocation failure, 4 OS error.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::{self, ErrorKind, Write};
use tracing_subscriber::EnvFilter;

use pagetouch::constants::{
    DEFAULT_ELEMENTS, DEFAULT_SEED, DEFAULT_STRIDE, ENV_ELEMENTS, ENV_FILL_BYTE, ENV_PATTERN,
    ENV_SEED, ENV_STRIDE, EXIT_OS_ERROR, EXIT_SUCCESS,
};
use pagetouch::{run_benchmark, BenchConfig, BenchError, BenchReport, Strategy, WritePattern};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Pre-touch strategy: lazy, eager (alias init, initialize) or prefetch
    #[clap(value_parser)]
    mode: Strategy,

    /// Number of 4-byte elements in the block
    #[arg(short = 'n', long, env = ENV_ELEMENTS, default_value_t = DEFAULT_ELEMENTS,
        value_parser = parse_positive)]
    elements: usize,

    /// Visit every Nth element in the timed loop (1 = every element)
    #[arg(short, long, env = ENV_STRIDE, default_value_t = DEFAULT_STRIDE,
        value_parser = parse_positive)]
    stride: usize,

    /// Byte written by the eager strategy, decimal or 0x-prefixed hex
    #[arg(long, env = ENV_FILL_BYTE, default_value = "0x00", value_parser = parse_byte)]
    fill_byte: u8,

    /// Value written to each visited element
    #[arg(long, env = ENV_PATTERN, value_enum, default_value_t = WritePattern::Random)]
    pattern: WritePattern,

    /// Seed for the random write pattern
    #[arg(long, env = ENV_SEED, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Print only the Time and Pagefaults lines
    #[arg(short, long)]
    quiet: bool,

    #[arg(short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().replace('_', "").parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("'{s}' is not a byte value: {e}"))
}

fn write_report(out: &mut impl Write, report: &BenchReport, quiet: bool) -> io::Result<()> {
    if quiet {
        write!(out, "{}", report.summary())?;
    } else {
        write!(out, "{report}")?;
    }
    out.flush()
}

fn run(cli: Cli) -> Result<()> {
    let config = BenchConfig::new(cli.mode)
        .with_elements(cli.elements)
        .with_stride(cli.stride)
        .with_fill_byte(cli.fill_byte)
        .with_pattern(cli.pattern)
        .with_seed(cli.seed);

    let report = run_benchmark(&config)
        .with_context(|| format!("{} benchmark over {} elements", config.strategy, config.elements))?;

    match write_report(&mut io::stdout().lock(), &report, cli.quiet) {
        // Gracefully exit on broken pipe (e.g., when piped to head)
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other.context("writing report"),
    }
}

/// Main CLI function
fn main() {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    // Missing or unknown mode exits here with clap's usage code (2)
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",        // no -v: WARN level
        1 => "info",        // -v: INFO level
        _ => "debug",       // -vv or more: DEBUG level
    };

    // Logs go to stderr so stdout only carries the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            e.downcast_ref::<BenchError>()
                .map_or(EXIT_OS_ERROR, BenchError::exit_code)
        }
    };
    std::process::exit(code);
}
