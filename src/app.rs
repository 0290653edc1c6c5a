//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the reference price lists
//! - sets up the exchange-rate source and cache
//! - runs the quote pipeline
//! - prints reports (text or JSON)

use chrono::{Duration, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, QuoteArgs, RateArgs, RecutArgs, TableArgs, TuiArgs};
use crate::data::rate_cache::DEFAULT_TTL_SECS;
use crate::data::{FxClient, PinnedRate, RateCache, RateSource};
use crate::error::{AppError, EXIT_NO_MATCH};

pub mod pipeline;

use pipeline::{Pricer, QuoteOutcome};

/// Entry point for the `dpx` binary.
pub fn run() -> Result<(), AppError> {
    // `dpx` and `dpx --round-csv x.csv` behave like `dpx tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    dotenvy::dotenv().ok();

    match cli.command {
        Command::Quote(args) => {
            init_tracing("warn");
            handle_quote(args)
        }
        Command::Recut(args) => {
            init_tracing("warn");
            handle_recut(args)
        }
        Command::Table(args) => {
            init_tracing("warn");
            handle_table(args)
        }
        // Log lines would tear the alternate screen.
        Command::Tui(args) => {
            init_tracing("off");
            handle_tui(args)
        }
    }
}

/// Stderr subscriber; `RUST_LOG` overrides `default_directive`.
fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Pinned rate when `--fx-rate` is given, otherwise the live client.
pub fn rate_source(args: &RateArgs) -> Result<Box<dyn RateSource>, AppError> {
    match args.fx_rate {
        Some(rate) => Ok(Box::new(PinnedRate(rate))),
        None => Ok(Box::new(FxClient::from_env(args.timeout())?)),
    }
}

pub fn rate_cache(args: &RateArgs) -> RateCache {
    RateCache::new(Duration::seconds(DEFAULT_TTL_SECS), args.fallback_rate)
}

fn handle_quote(args: QuoteArgs) -> Result<(), AppError> {
    let table = crate::io::load_price_table(&args.source.paths())?;
    let source = rate_source(&args.rate)?;
    let mut rates = rate_cache(&args.rate);

    let request = args.request();
    let outcome = Pricer::new(&table, &mut rates, source.as_ref()).quote(&request, Utc::now());

    if args.json {
        print_json(&outcome)?;
    } else {
        println!("{}", crate::report::format_stone_line(&request.stone));
        if let Some(line) = crate::report::format_last_updated(table.latest_as_of()) {
            println!("{line}");
        }
        println!();
        print!("{}", crate::report::format_outcome("Diamond", &outcome));
    }

    match outcome {
        QuoteOutcome::Priced(_) => Ok(()),
        QuoteOutcome::NoMatch(_) => Err(AppError::new(EXIT_NO_MATCH, "No price match.")),
    }
}

fn handle_recut(args: RecutArgs) -> Result<(), AppError> {
    let table = crate::io::load_price_table(&args.source.paths())?;
    let source = rate_source(&args.rate)?;
    let mut rates = rate_cache(&args.rate);

    let out = Pricer::new(&table, &mut rates, source.as_ref()).recut(&args.request_a(), &args.request_b(), Utc::now());

    if args.json {
        print_json(&out)?;
    } else {
        print!("{}", crate::report::format_recut(&out, table.latest_as_of()));
    }
    Ok(())
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let table = crate::io::load_price_table(&args.source.paths())?;
    print!("{}", crate::report::format_table_summary(&table));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::runtime(format!("Failed to serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Rewrite argv so `dpx` defaults to `dpx tui`.
///
/// Rules:
/// - `dpx`                      -> `dpx tui`
/// - `dpx --recut ...`          -> `dpx tui --recut ...`
/// - `dpx --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "quote" | "recut" | "table" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_the_tui() {
        assert_eq!(rewrite_args(argv(&["dpx"])), argv(&["dpx", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_the_tui() {
        assert_eq!(
            rewrite_args(argv(&["dpx", "--recut", "--fx-rate", "84"])),
            argv(&["dpx", "tui", "--recut", "--fx-rate", "84"])
        );
    }

    #[test]
    fn subcommands_and_help_are_left_alone() {
        for args in [
            argv(&["dpx", "quote", "--weight", "1"]),
            argv(&["dpx", "table"]),
            argv(&["dpx", "--help"]),
            argv(&["dpx", "-V"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn pinned_rate_skips_the_live_client() {
        let args = RateArgs {
            fx_rate: Some(84.0),
            fallback_rate: 85.5,
            fx_timeout_secs: 5,
        };
        let source = rate_source(&args).unwrap();
        assert_eq!(source.fetch_rate().unwrap(), 84.0);
        assert_eq!(rate_cache(&args).fallback(), 85.5);
    }
}
