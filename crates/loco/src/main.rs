//! loco CLI - collects stdin into time-rotated log files

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set JSON output mode if requested
    output::set_json_mode(cli.json);

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries collected data (--tee) and listings, diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("loco={0},loco_core={0},loco_logs={0}", log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Config(args) => config::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::List => list::execute(),
        Commands::Remove { file } => remove::execute(&file),
        Commands::Defaults(args) => defaults::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
