// src/filesystem/mod.rs

//! Filesystem operations for input preparation
//!
//! This module provides:
//! - Sanitization of untrusted archive entry names
//! - Directory profiling with leaf-name collision detection
//! - Flattening of nested trees into one directory

mod flatten;
pub mod path;
mod profile;

pub use flatten::{FlattenOutcome, copy_flat, flatten_directory};
pub use profile::{DirectoryProfile, is_excluded, profile_directory};

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Move a file, falling back to copy + remove across filesystems
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Rename across devices, copying {} to {}",
                from.display(),
                to.display()
            );
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}

/// Whether `dir` has at least one entry
pub fn has_entries(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_some())
}
