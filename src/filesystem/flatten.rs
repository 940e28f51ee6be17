// src/filesystem/flatten.rs

//! Collapse a nested tree into one flat directory
//!
//! The converter only reads the top level of its input directory. Files are
//! moved out of arbitrarily deep archive layouts into a single directory,
//! keeping their leaf names.

use crate::error::{Error, Result};
use crate::filesystem::move_file;
use crate::filesystem::profile::{DirectoryProfile, profile_directory};
use crate::report::Reporter;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Source and target profiles of one flattening run
#[derive(Debug, Clone)]
pub struct FlattenOutcome {
    pub source: DirectoryProfile,
    pub target: DirectoryProfile,
}

/// Move every profiled file under `source` directly into `target`
///
/// Collisions are caught while profiling `source`, before anything moves.
/// An existing `target` is replaced when `overwrite` is set and is an
/// `Error::DestinationExists` otherwise. Excluded metadata files stay behind
/// in `source`.
pub fn flatten_directory(
    source: &Path,
    target: &Path,
    overwrite: bool,
    reporter: &dyn Reporter,
) -> Result<FlattenOutcome> {
    let source_profile = profile_directory(source)?;

    if target.exists() {
        if overwrite {
            debug!("Removing existing flatten target {}", target.display());
            fs::remove_dir_all(target)?;
        } else {
            return Err(Error::DestinationExists(target.to_path_buf()));
        }
    }
    fs::create_dir(target)?;

    for (leaf, path) in &source_profile.leaf_to_path {
        move_file(path, &target.join(leaf))?;
    }

    let target_profile = profile_directory(target)?;

    info!(
        "Flattened {} file(s) from {} into {}",
        target_profile.len(),
        source.display(),
        target.display()
    );
    reporter.file_tree("file_tree_source", &source_profile.paths);
    reporter.file_tree("file_tree_target", &target_profile.paths);

    Ok(FlattenOutcome {
        source: source_profile,
        target: target_profile,
    })
}

/// Copy every profiled file under `source` into `target`, flat
///
/// Like `flatten_directory` but leaves `source` untouched; used when the
/// submitted input is itself a directory. `target` must already exist.
pub fn copy_flat(source: &Path, target: &Path) -> Result<DirectoryProfile> {
    let profile = profile_directory(source)?;
    for (leaf, path) in &profile.leaf_to_path {
        fs::copy(path, target.join(leaf))?;
    }
    Ok(profile)
}
