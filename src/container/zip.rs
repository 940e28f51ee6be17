// src/container/zip.rs

//! Zip entry listing and extraction

use super::{ContainerFormat, Entry, create_entry_file, malformed};
use crate::error::Result;
use crate::filesystem::path::safe_join;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::debug;

fn open_archive(path: &Path) -> Result<::zip::ZipArchive<File>> {
    let file = File::open(path)?;
    ::zip::ZipArchive::new(file).map_err(|e| malformed(path, ContainerFormat::Zip, e))
}

/// List every member of the zip at `path`, in central directory order
///
/// Members whose name normalises to nothing (e.g. `./`) are dropped.
pub(super) fn list_entries(path: &Path) -> Result<Vec<Entry>> {
    let mut archive = open_archive(path)?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let member = archive
            .by_index_raw(i)
            .map_err(|e| malformed(path, ContainerFormat::Zip, e))?;
        let entry = Entry::new(member.name(), member.size(), member.is_dir(), member.is_file(), i);
        if !entry.path.is_empty() {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Extract `entries` from the zip at `path` into `dest`
///
/// Each entry is written under its (possibly rewritten) `path`, looked up in
/// the archive by its original position.
pub(super) fn extract_entries<I>(path: &Path, dest: &Path, entries: I) -> Result<usize>
where
    I: IntoIterator<Item = Entry>,
{
    let mut archive = open_archive(path)?;
    let mut written = 0;

    for entry in entries {
        if entry.is_dir {
            fs::create_dir_all(safe_join(dest, &entry.path)?)?;
            continue;
        }
        if !entry.is_file {
            debug!("Skipping non-regular zip entry {}", entry.path);
            continue;
        }

        let target = safe_join(dest, &entry.path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut member = archive
            .by_index(entry.index())
            .map_err(|e| malformed(path, ContainerFormat::Zip, e))?;
        let mut out = create_entry_file(&target, &entry)?;
        io::copy(&mut member, &mut out)?;
        written += 1;
    }

    Ok(written)
}
