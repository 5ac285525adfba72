//! Mote CLI
//!
//! Runs the fixture world scenarios and pipes input through external
//! programs.

use mote_eval::config::parse_depth;
use mote_eval::{RuntimeConfig, MAX_DEPTH_ENV};
use motec::commands::{run_capture, run_demo, DemoOptions};
use motec::tracing_setup::init_tracing;
use motec::SubprocessRunner;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "demo" => {
            let mut options = DemoOptions {
                config: config_from_env(),
                filter: None,
            };
            for arg in args.iter().skip(2) {
                if let Some(raw) = arg.strip_prefix("--max-depth=") {
                    let Some(depth) = parse_depth(raw) else {
                        eprintln!("error: --max-depth must be a number or `unlimited`, got `{raw}`");
                        std::process::exit(1);
                    };
                    options.config.max_call_depth = depth;
                } else if let Some(filter) = arg.strip_prefix("--filter=") {
                    options.filter = Some(filter.to_string());
                } else {
                    eprintln!("error: unknown option '{arg}'");
                    eprintln!("Usage: mote demo [--max-depth=N] [--filter=<pattern>]");
                    std::process::exit(1);
                }
            }
            std::process::exit(run_demo(&options));
        }
        "capture" => {
            if args.len() < 3 {
                eprintln!("Usage: mote capture <program> [args...]");
                eprintln!();
                eprintln!("Reads stdin, runs <program> on it and prints its stdout.");
                std::process::exit(1);
            }
            std::process::exit(run_capture(&SubprocessRunner, &args[2], &args[3..]));
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Mote {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Configuration from the environment, exiting on a malformed value.
fn config_from_env() -> RuntimeConfig {
    match RuntimeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Mote object runtime");
    println!();
    println!("Usage: mote <command> [options]");
    println!();
    println!("Commands:");
    println!("  demo                     Run the fixture world scenarios");
    println!("  capture <program> [args] Pipe stdin through <program>, print its stdout");
    println!("  help                     Show this help message");
    println!("  version                  Show version information");
    println!();
    println!("Demo options:");
    println!("  --max-depth=<n>     Call depth limit, or `unlimited`");
    println!("  --filter=<pattern>  Only run scenarios whose name contains pattern");
    println!();
    println!("Environment:");
    println!("  {MAX_DEPTH_ENV}       Default call depth limit (overridden by --max-depth)");
    println!("  RUST_LOG            Tracing filter, e.g. mote_eval=debug");
    println!("  MOTE_LOG_TREE       Show tracing output as an indented span tree");
    println!();
    println!("Examples:");
    println!("  mote demo");
    println!("  mote demo --filter=block --max-depth=64");
    println!("  echo hello | mote capture tr a-z A-Z");
}
