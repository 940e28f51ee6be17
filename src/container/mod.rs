// src/container/mod.rs

//! Archive containers submitted as converter input
//!
//! A container is classified once from its signature bytes
//! (`classify`), opened into an ordered entry listing (`Container::open`),
//! guarded against empty content, and extracted either as-is or through a
//! re-rooted view of its entries (`Container::reroot`).
//!
//! # Example
//!
//! ```no_run
//! use niiprep::container::{classify, Container};
//! use std::path::Path;
//!
//! let path = Path::new("/flywheel/input/series.zip");
//! if let Some(format) = classify(path)?.format() {
//!     let container = Container::open(path, format)?;
//!     container.ensure_not_empty()?;
//!     println!("{} entries", container.entries().len());
//! }
//! # Ok::<(), niiprep::Error>(())
//! ```

mod classify;
mod reroot;
mod tar;
mod zip;

pub use classify::{ContainerKind, classify, is_tar_header, is_zip_signature};
pub use reroot::Rerooted;

use crate::compression::CompressionFormat;
use crate::error::{Error, Result};
use crate::filesystem::path::leaf_name;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Container format of an opened archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Zip,
    /// Tar stream under an optional compression layer
    Tar(CompressionFormat),
}

impl ContainerFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar(compression) => compression.name(),
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One archive member, as listed
///
/// Paths are normalised: `\` becomes `/`, leading `./` and trailing `/` are
/// removed. Rewriting produces a new `Entry`; the archive is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    /// Uncompressed size in bytes
    pub size: u64,
    pub is_dir: bool,
    /// Regular file (not a directory, link or device)
    pub is_file: bool,
    /// Position in the archive, used to find the data again on extraction
    index: usize,
    /// Normalised path as listed, kept across rewrites
    source: String,
}

impl Entry {
    pub(crate) fn new(raw_name: &str, size: u64, is_dir: bool, is_file: bool, index: usize) -> Self {
        let path = normalize_entry_name(raw_name);
        Self {
            source: path.clone(),
            path,
            size,
            is_dir,
            is_file,
            index,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Path as listed in the archive, before any rewrite
    pub fn source(&self) -> &str {
        &self.source
    }

    /// First path component, if the entry lives under a directory
    fn top_level_dir(&self) -> Option<&str> {
        match self.path.split_once('/') {
            Some((first, _)) if !first.is_empty() => Some(first),
            _ if self.is_dir && !self.path.is_empty() => Some(self.path.as_str()),
            _ => None,
        }
    }
}

fn normalize_entry_name(raw: &str) -> String {
    let mut name = raw.replace('\\', "/").trim_start_matches('/').to_string();
    while let Some(rest) = name.strip_prefix("./") {
        name = rest.to_string();
    }
    if name == "." {
        name.clear();
    }
    name.trim_end_matches('/').to_string()
}

/// An opened archive and its ordered entry listing
#[derive(Debug, Clone)]
pub struct Container {
    path: PathBuf,
    format: ContainerFormat,
    entries: Vec<Entry>,
}

impl Container {
    /// Open `path` as `format` and list its entries
    ///
    /// Fails with `Error::MalformedContainer` when the file cannot be read
    /// as the detected format.
    pub fn open(path: impl AsRef<Path>, format: ContainerFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match format {
            ContainerFormat::Zip => zip::list_entries(&path)?,
            ContainerFormat::Tar(compression) => tar::list_entries(&path, compression)?,
        };

        info!(
            "Establishing input as {} archive: {} ({} entries)",
            format,
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            format,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Archive filename, without its directory
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sum of uncompressed entry sizes
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Reject an archive whose entries hold no content at all
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.total_size() == 0 {
            return Err(Error::EmptyInput(self.path.clone()));
        }
        Ok(())
    }

    /// Top-level directories, in order of first appearance
    ///
    /// Covers explicit directory entries and directories implied by nested
    /// file paths, since many zip writers omit directory entries.
    pub fn top_level_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = Vec::new();
        for entry in &self.entries {
            if let Some(dir) = entry.top_level_dir()
                && !dirs.iter().any(|d| d == dir)
            {
                dirs.push(dir.to_string());
            }
        }
        dirs
    }

    /// Whether any entry name ends in `.{ext}`, ignoring case
    pub fn contains_extension(&self, ext: &str) -> bool {
        self.entries
            .iter()
            .any(|e| crate::filesystem::path::has_extension(&e.path, ext))
    }

    /// Regular-file entries with `prefix/` stripped from their paths
    pub fn reroot(&self, prefix: &str) -> Rerooted<'_> {
        Rerooted::new(&self.entries, prefix)
    }

    /// Extract `entries` below `dest`
    ///
    /// Directory entries are created, regular files written, anything else
    /// (links, devices) skipped. Returns the number of files written.
    pub fn extract<I>(&self, dest: &Path, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = Entry>,
    {
        let count = match self.format {
            ContainerFormat::Zip => zip::extract_entries(&self.path, dest, entries)?,
            ContainerFormat::Tar(compression) => {
                tar::extract_entries(&self.path, compression, dest, entries)?
            }
        };
        debug!("Extracted {} file(s) into {}", count, dest.display());
        Ok(count)
    }

    /// Extract every entry as listed
    pub fn extract_all(&self, dest: &Path) -> Result<usize> {
        self.extract(dest, self.entries.iter().cloned())
    }
}

/// Create the file `entry` is extracted to
///
/// An existing file at `target` means two entries map onto the same path
/// (duplicate members, or a re-rooted file landing on a root-level one), which
/// is reported as a collision instead of overwriting the earlier data.
pub(crate) fn create_entry_file(target: &Path, entry: &Entry) -> Result<File> {
    match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::NameCollision {
            name: leaf_name(target).unwrap_or_default(),
            first: target.to_path_buf(),
            second: PathBuf::from(entry.source()),
        }),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn malformed(path: &Path, format: ContainerFormat, reason: impl std::fmt::Display) -> Error {
    Error::MalformedContainer {
        path: path.to_path_buf(),
        format: format.name(),
        reason: reason.to_string(),
    }
}
