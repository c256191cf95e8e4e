//! Bundle CLI - Main entry point

use anyhow::Result;
use bundle_core::Phase;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "bundle")]
#[command(version)]
#[command(about = "Bundle configuration tools", long_about = None)]
struct Cli {
    /// Enable debug logging, including output of generator processes
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mutator pipeline of one phase and print the resulting configuration
    Mutate {
        /// Bundle root directory
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Phase to run (load, init)
        #[arg(long, default_value = "load")]
        phase: Phase,

        /// Stop generator processes after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the changes between two configuration files
    Diff {
        /// Configuration before the change
        left: PathBuf,

        /// Configuration after the change
        right: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.debug { "debug" } else { "bundle=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Mutate {
            root,
            phase,
            timeout,
        } => commands::mutate::execute(commands::mutate::MutateArgs {
            root,
            phase,
            timeout,
        }),
        Commands::Diff { left, right } => commands::diff::execute(&left, &right),
    }
}
