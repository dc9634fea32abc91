//! cdnplan CLI - plan and simulate secure static-site CDN deployments
//!
//! Usage: cdnplan <COMMAND>
//!
//! Commands:
//!   plan      Show the ordered resource plan and what would change
//!   check     Validate the configuration and audit the derived policies
//!   simulate  Apply the plan against the simulated cloud
//!   rewrite   Run the viewer-request rewrite rules against request URIs

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cdnplan::presentation::{Cli, Commands, Style};

use commands::simulate::SimulateArgs;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let config = cli.config.as_deref();
    let style = Style::detect(cli.color);

    match cli.command {
        Commands::Plan { state, diff } => {
            commands::plan::cmd_plan(config, state, diff, cli.json, style)
        }
        Commands::Check { strict_warnings } => {
            commands::check::cmd_check(config, strict_warnings, cli.json, style)
        }
        Commands::Simulate {
            concurrency,
            state,
            skip_content,
        } => commands::simulate::cmd_simulate(
            config,
            SimulateArgs {
                concurrency,
                state,
                skip_content,
            },
            cli.json,
            cli.verbose,
            style,
        ),
        Commands::Rewrite { uris } => {
            commands::rewrite::cmd_rewrite(config, &uris, cli.json, style)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `-v` level
fn init_tracing(verbose: u8, json: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
