//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Talk to a tool-using agent. Side-effecting actions wait for your approval.
#[derive(Parser, Debug)]
#[command(name = "agentry", version, about)]
pub struct Cli {
    /// Message to send; reads lines from stdin when omitted
    pub message: Option<String>,

    /// Session id; the agent's state is kept between invocations under this id
    #[arg(short, long, default_value = "default")]
    pub session: String,

    /// Directory for session snapshots and the notes file
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
