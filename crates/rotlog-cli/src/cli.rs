//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rotlog")]
#[command(version, about = "Leveled logging to the console and rotating files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log every line read from stdin
    Write(WriteArgs),

    /// Show where each level is routed
    Check(CheckArgs),

    /// Print the writer identity of a log file
    Identity {
        /// Log directory
        dir: PathBuf,

        /// Log file name
        file: String,
    },
}

#[derive(Args)]
pub struct WriteArgs {
    /// Config file (default: rotlog.toml/yaml/yml/json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Level of the logged lines
    #[arg(short, long, default_value = "info")]
    pub level: String,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Config file (default: rotlog.toml/yaml/yml/json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
