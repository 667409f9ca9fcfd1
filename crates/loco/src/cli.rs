//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use loco_core::Interval;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loco")]
#[command(version, about = "Collects stdin into time-rotated log files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a log file, or change its rotation settings
    Config(ConfigArgs),

    /// Append stdin to a log file, rotating it when due
    Collect(CollectArgs),

    /// List the registered log files
    List,

    /// Forget a registered log file (the file itself is kept)
    Remove {
        /// Log file
        file: PathBuf,
    },

    /// Show or set the default rotation settings
    Defaults(DefaultsArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Log file
    pub file: PathBuf,

    /// Rotation interval (e.g. "30m", "12h", "1d", "2w", "1M")
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<Interval>,

    /// Rotated file suffix (%c counter, %Y %m %d %H %M %S date, %% literal %)
    #[arg(short, long)]
    pub suffix: Option<String>,
}

#[derive(Args)]
pub struct CollectArgs {
    /// Log file
    pub file: PathBuf,

    /// Also copy stdin to stdout
    #[arg(short, long)]
    pub tee: bool,
}

#[derive(Args)]
pub struct DefaultsArgs {
    /// New default rotation interval
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<Interval>,

    /// New default rotated file suffix
    #[arg(short, long)]
    pub suffix: Option<String>,
}

fn parse_interval(s: &str) -> Result<Interval, String> {
    Interval::parse(s).map_err(|_| {
        format!(
            "Invalid interval '{}': expected a number followed by m, h, d, w or M",
            s
        )
    })
}
