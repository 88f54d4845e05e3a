//! tinytest CLI - runs the engine's self-check suite and replays its failures.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod reporter;
mod suite;

#[derive(Parser)]
#[command(name = "tinytest")]
#[command(about = "Minimal sequential test engine with debug-to-failure replay", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a tinytest.toml (defaults to ./tinytest.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every registered test in order
    Run {
        /// Output format (pretty, json)
        #[arg(long, default_value = "pretty")]
        format: String,
    },
    /// Replay one test up to a recorded failure and pause there
    Debug {
        /// Cookie from a fail event, e.g. '{"name":"value - maps","offset":0}'
        #[arg(long)]
        cookie: String,
        /// Output format (pretty, json)
        #[arg(long, default_value = "pretty")]
        format: String,
    },
    /// List registered tests
    List,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run { format } => commands::run::run(config, &format),
        Commands::Debug { cookie, format } => commands::debug::run(config, &cookie, &format),
        Commands::List => commands::list::run(config),
    }
}
