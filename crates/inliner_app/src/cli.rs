//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "inliner",
    version,
    about = "Replace feed summaries with the full article content behind their links."
)]
pub struct Cli {
    /// RON configuration file (fetch settings, endpoints, feed flags).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print which extraction strategy each URL would use.
    Classify { urls: Vec<String> },
    /// Print `{"content": ...}` for each URL, sanitized, one JSON object per line.
    Embed { urls: Vec<String> },
    /// Print the full text for a URL; only when sharing is enabled in the config.
    FullText { url: String },
    /// Read an article as JSON on stdin and apply the feed's configured flags.
    Filter {
        #[arg(long)]
        feed: i64,
    },
    /// Read an article as JSON on stdin and apply a filter action (`action_inline`, `action_append`).
    Action { name: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
