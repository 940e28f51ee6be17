// src/arrange/pairing.rs

//! Header/data pair naming
//!
//! The converter pairs a PAR header with its REC data file by stem, and only
//! recognises lower-case extensions. Both files are renamed to one shared
//! stem.

use crate::error::{Error, Result};
use crate::filesystem::path::has_extension;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extension of the header file, without the dot
pub const HEADER_EXTENSION: &str = "par";

/// Extension of the data file, without the dot
pub const DATA_EXTENSION: &str = "rec";

/// Check that `header` and `data` form a header/data pair
///
/// Fails with `Error::InvalidPairing` unless `header` ends in `.par` and
/// `data` ends in `.rec`, ignoring case.
pub fn check_pairing(header: &Path, data: &Path) -> Result<()> {
    if has_extension(header, HEADER_EXTENSION) && has_extension(data, DATA_EXTENSION) {
        Ok(())
    } else {
        Err(Error::InvalidPairing {
            header: header.to_path_buf(),
            data: data.to_path_buf(),
        })
    }
}

fn pair_extension(path: &Path) -> Option<&'static str> {
    [HEADER_EXTENSION, DATA_EXTENSION]
        .into_iter()
        .find(|ext| has_extension(path, ext))
}

/// Rename every header and data file under `dir` to `<stem>.<ext>`
///
/// Files stay in their own directory; only the name changes, and the
/// extension is lower-cased. Renaming onto a different existing file is an
/// `Error::NameCollision`. Returns the new paths.
pub fn adjust_pair_filenames(dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file()
            && let Some(ext) = pair_extension(entry.path())
        {
            candidates.push((entry.into_path(), ext));
        }
    }

    let mut renamed = Vec::with_capacity(candidates.len());
    for (path, ext) in candidates {
        let parent = path.parent().unwrap_or(dir);
        let new_path = parent.join(format!("{stem}.{ext}"));

        if new_path != path {
            if new_path.exists() && !is_same_file(&path, &new_path)? {
                return Err(Error::NameCollision {
                    name: format!("{stem}.{ext}"),
                    first: new_path,
                    second: path,
                });
            }
            debug!("Renaming {} to {}", path.display(), new_path.display());
            fs::rename(&path, &new_path)?;
        }
        renamed.push(new_path);
    }

    info!("Adjusted {} header/data file name(s) to stem {}", renamed.len(), stem);
    Ok(renamed)
}

/// Case-insensitive filesystems report a case-only rename target as existing
fn is_same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(a.canonicalize()? == b.canonicalize()?)
}
