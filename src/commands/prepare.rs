// src/commands/prepare.rs
//! Input preparation commands

use anyhow::{Context, Result};
use niiprep::{LogReporter, merge_corrected_volumes, prepare_input, sanitize_name};
use std::path::Path;
use tracing::info;

/// Arrange `input` (and its paired `data` file) under `work_dir`
///
/// Prints the prepared directory on success.
pub fn cmd_prepare(input: &Path, data: Option<&Path>, work_dir: &Path) -> Result<()> {
    info!("Preparing converter input from {}", input.display());

    let dir = prepare_input(input, data, work_dir, &LogReporter)
        .with_context(|| format!("Failed to prepare input {}", input.display()))?;

    println!("{}", dir.display());
    Ok(())
}

/// Merge volume-correction output in `dir`
pub fn cmd_merge_corrected(dir: &Path) -> Result<()> {
    let merged = merge_corrected_volumes(dir)
        .with_context(|| format!("Failed to merge corrected volumes in {}", dir.display()))?;

    if merged {
        println!("Merged corrected volumes into {}", dir.display());
    } else {
        println!("No corrected volumes in {}", dir.display());
    }
    Ok(())
}

/// Print the sanitized directory token for `name`
pub fn cmd_sanitize(name: &str) -> Result<()> {
    println!("{}", sanitize_name(name));
    Ok(())
}
