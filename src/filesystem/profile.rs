// src/filesystem/profile.rs

//! Directory profiling
//!
//! A profile lists every file under a directory and maps each leaf name to
//! its full path. Flattening relies on that map being collision-free, so the
//! profiler refuses trees where two files share a leaf name.

use crate::error::{Error, Result};
use crate::filesystem::path::leaf_name;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

/// macOS Finder metadata and AppleDouble resource forks
static EXCLUDE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\.DS_Store.*", r"^\._.*"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

/// Whether a leaf name is platform metadata noise
pub fn is_excluded(leaf: &str) -> bool {
    EXCLUDE_PATTERNS.iter().any(|re| re.is_match(leaf))
}

/// Snapshot of the files under one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryProfile {
    /// Leaf names of all non-excluded files
    pub leaf_names: BTreeSet<String>,
    /// Every file found, excluded ones included
    pub paths: Vec<PathBuf>,
    /// Leaf name -> full path, for non-excluded files
    pub leaf_to_path: BTreeMap<String, PathBuf>,
}

impl DirectoryProfile {
    pub fn len(&self) -> usize {
        self.leaf_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_to_path.is_empty()
    }
}

/// Profile the directory tree rooted at `root`
///
/// Walks top-down. Fails with `Error::NameCollision` on the first leaf name
/// seen twice.
pub fn profile_directory(root: impl AsRef<Path>) -> Result<DirectoryProfile> {
    let root = root.as_ref();
    let mut profile = DirectoryProfile::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let Some(leaf) = leaf_name(&path) else {
            continue;
        };

        if !is_excluded(&leaf) {
            if let Some(first) = profile.leaf_to_path.get(&leaf) {
                return Err(Error::NameCollision {
                    name: leaf,
                    first: first.clone(),
                    second: path,
                });
            }
            profile.leaf_names.insert(leaf.clone());
            profile.leaf_to_path.insert(leaf, path.clone());
        }

        profile.paths.push(path);
    }

    debug!(
        "Profiled {}: {} file(s), {} after exclusions",
        root.display(),
        profile.paths.len(),
        profile.leaf_to_path.len()
    );

    Ok(profile)
}
