// src/commands/mod.rs
//! Command handlers for the niiprep CLI

mod prepare;
mod resolve;

pub use prepare::{cmd_merge_corrected, cmd_prepare, cmd_sanitize};
pub use resolve::cmd_resolve;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;

/// Write a completion script for `shell` to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut command = crate::cli::Cli::command();
    clap_complete::generate(shell, &mut command, "niiprep", &mut io::stdout());
    Ok(())
}
