// src/container/tar.rs

//! Tar entry listing and extraction
//!
//! Tar is a stream format, so entries are located again on extraction by
//! replaying the archive and matching positions.

use super::{ContainerFormat, Entry, create_entry_file, malformed};
use crate::compression::CompressionFormat;
use crate::error::Result;
use crate::filesystem::path::safe_join;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

fn open_archive(path: &Path, compression: CompressionFormat) -> Result<::tar::Archive<Box<dyn Read>>> {
    let file = File::open(path)?;
    let reader = compression.decoder(file)?;
    Ok(::tar::Archive::new(reader))
}

/// List every member of the tarball at `path`, in stream order
pub(super) fn list_entries(path: &Path, compression: CompressionFormat) -> Result<Vec<Entry>> {
    let format = ContainerFormat::Tar(compression);
    let mut archive = open_archive(path, compression)?;
    let mut entries = Vec::new();

    let members = archive.entries().map_err(|e| malformed(path, format, e))?;
    for (i, member) in members.enumerate() {
        let member = member.map_err(|e| malformed(path, format, e))?;
        let kind = member.header().entry_type();
        let name = String::from_utf8_lossy(&member.path_bytes()).into_owned();

        let entry = Entry::new(&name, member.size(), kind.is_dir(), kind.is_file(), i);
        if !entry.path.is_empty() {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Extract `entries` from the tarball at `path` into `dest`
pub(super) fn extract_entries<I>(
    path: &Path,
    compression: CompressionFormat,
    dest: &Path,
    entries: I,
) -> Result<usize>
where
    I: IntoIterator<Item = Entry>,
{
    let format = ContainerFormat::Tar(compression);
    let mut wanted: HashMap<usize, Entry> = entries.into_iter().map(|e| (e.index(), e)).collect();
    if wanted.is_empty() {
        return Ok(0);
    }

    let mut archive = open_archive(path, compression)?;
    let mut written = 0;

    let members = archive.entries().map_err(|e| malformed(path, format, e))?;
    for (i, member) in members.enumerate() {
        let mut member = member.map_err(|e| malformed(path, format, e))?;
        let Some(entry) = wanted.remove(&i) else {
            continue;
        };

        if entry.is_dir {
            fs::create_dir_all(safe_join(dest, &entry.path)?)?;
        } else if entry.is_file {
            let target = safe_join(dest, &entry.path)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = create_entry_file(&target, &entry)?;
            io::copy(&mut member, &mut out)?;
            written += 1;
        } else {
            debug!("Skipping non-regular tar entry {}", entry.path);
        }

        if wanted.is_empty() {
            break;
        }
    }

    Ok(written)
}
