//! jinja-watch CLI
//!
//! Usage: jinja-watch [COMMAND]
//!
//! Commands:
//!   watch   Compile everything, then recompile on every change (default)
//!   build   Compile everything once and exit
//!   check   Check the root, the configuration document and the formatter

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => commands::cmd_watch(&cli.run, cli.json, cli.verbose),
        Commands::Build => commands::cmd_build(&cli.run, cli.json, cli.verbose),
        Commands::Check => commands::cmd_check(&cli.run, cli.json),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `-v` count.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jinja_watch={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
