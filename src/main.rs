#![deny(clippy::unwrap_used)]
#![recursion_limit = "256"]

mod cmd;
mod common;
mod config;
mod http_agent;
mod js;
mod loader;
mod manifest;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use common::STARTING;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Blitz::parse();

    tracing_subscriber::registry()
        // Filter spans based on the verbosity flags.
        .with(eval_logging(&cli))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .try_init()
        .context("error initializing logging")?;

    tracing::debug!(
        "{} Starting {} {}",
        STARTING,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    cli.run().await
}

fn eval_logging(cli: &Blitz) -> tracing_subscriber::EnvFilter {
    let directives = match (cli.verbose, cli.quiet) {
        // quiet overrides verbose
        (_, true) => "error,blitz_build=warn",
        // increase verbosity
        (0, false) => "error,blitz_build=info",
        (1, false) => "error,blitz_build=debug",
        (_, false) => "error,blitz_build=trace",
    };
    tracing_subscriber::EnvFilter::new(directives)
}

/// Generate serverless page wrappers and resolve the configuration of a Blitz.js application.
#[derive(Parser)]
#[command(about, author, version)]
struct Blitz {
    #[command(subcommand)]
    action: BlitzSubcommands,
    /// Enable verbose logging.
    #[arg(short, long, global(true), action=ArgAction::Count)]
    pub verbose: u8,
    /// Be more quiet, conflicts with --verbose
    #[arg(short, long, global(true), conflicts_with("verbose"))]
    pub quiet: bool,
}

impl Blitz {
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<()> {
        match self.action {
            BlitzSubcommands::Config(inner) => inner.run().await,
            BlitzSubcommands::Loader(inner) => inner.run().await,
            BlitzSubcommands::Rewrites(inner) => inner.run().await,
        }
    }
}

#[derive(Subcommand)]
enum BlitzSubcommands {
    /// Configuration controls.
    Config(cmd::config::Config),
    /// Generate the serverless wrapper of a page.
    Loader(cmd::loader::Loader),
    /// Show the flattened rewrites of a routes manifest.
    Rewrites(cmd::rewrites::Rewrites),
}
