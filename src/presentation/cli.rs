//! CLI Argument Parsing
//!
//! Global flags (--config, --json, --color, --verbose) are inherited by all
//! subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::executor::DEFAULT_MAX_CONCURRENCY;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// cdnplan - plan and simulate secure static-site CDN deployments
#[derive(Parser, Debug)]
#[command(name = "cdnplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./cdnplan.toml, then the user config)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output NDJSON events for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the ordered resource plan and what would change
    Plan {
        /// State file to compare against
        #[arg(long, value_name = "PATH")]
        state: Option<PathBuf>,

        /// Show attribute diffs for updated nodes
        #[arg(long)]
        diff: bool,
    },

    /// Validate the configuration and audit the derived policies
    Check {
        /// Fail on warnings too (CI mode)
        #[arg(long)]
        strict_warnings: bool,
    },

    /// Apply the plan against the simulated cloud (no real API calls)
    Simulate {
        /// Maximum number of nodes applied at once
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        concurrency: usize,

        /// Persist state to this file instead of memory
        #[arg(long, value_name = "PATH")]
        state: Option<PathBuf>,

        /// Skip the content upload
        #[arg(long)]
        skip_content: bool,
    },

    /// Run the viewer-request rewrite rules against request URIs
    Rewrite {
        /// Request URIs, e.g. /docs/intro
        #[arg(required = true, value_name = "URI")]
        uris: Vec<String>,
    },
}
