// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Prepare {
            input,
            data,
            work_dir,
        } => commands::cmd_prepare(&input, data.as_deref(), &work_dir),
        Commands::Resolve(args) => commands::cmd_resolve(&args),
        Commands::MergeCorrected { dir } => commands::cmd_merge_corrected(&dir),
        Commands::Sanitize { name } => commands::cmd_sanitize(&name),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
