// src/arrange/correction.rs

//! Merge the output of incomplete-volume correction back into the input
//!
//! The correction script runs on a prepared directory and, when it finds
//! incomplete volumes, leaves exactly two subdirectories behind: the files to
//! keep and the orphans it removed from the series.

use crate::error::{Error, Result};
use crate::filesystem::move_file;
use std::fs;
use std::path::Path;
use tracing::info;

/// Subdirectory holding the files to keep
pub const CORRECTED_DIR: &str = "corrected_dcm";

/// Subdirectory holding the files dropped from incomplete volumes
pub const ORPHAN_DIR: &str = "orphan_dcm";

/// Replace the contents of `dir` with its corrected files
///
/// Returns `false` when no correction output is present. Otherwise `dir`
/// must hold exactly the corrected and orphan subdirectories, else
/// `Error::UnexpectedCorrectionOutput`; the orphans are deleted and the
/// corrected files moved up into `dir`.
pub fn merge_corrected_volumes(dir: &Path) -> Result<bool> {
    let corrected = dir.join(CORRECTED_DIR);
    if !corrected.is_dir() {
        info!("No files from incomplete volumes found in {}", dir.display());
        return Ok(false);
    }

    let mut names = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    if names != [CORRECTED_DIR, ORPHAN_DIR] {
        return Err(Error::UnexpectedCorrectionOutput {
            path: dir.to_path_buf(),
            reason: format!(
                "expected only {} and {}, found {}",
                CORRECTED_DIR,
                ORPHAN_DIR,
                names.join(", ")
            ),
        });
    }

    info!("Files from incomplete volumes found in {}, removing", dir.display());
    fs::remove_dir_all(dir.join(ORPHAN_DIR))?;

    let mut moved = 0;
    for entry in fs::read_dir(&corrected)? {
        let entry = entry?;
        move_file(&entry.path(), &dir.join(entry.file_name()))?;
        moved += 1;
    }
    fs::remove_dir_all(&corrected)?;

    info!("{} file(s) remain after incomplete volume correction", moved);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_correction_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("image_1.dcm"), b"x").unwrap();

        assert!(!merge_corrected_volumes(dir.path()).unwrap());
        assert!(dir.path().join("image_1.dcm").exists());
    }

    #[test]
    fn test_merge_moves_corrected_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(CORRECTED_DIR)).unwrap();
        fs::create_dir(dir.path().join(ORPHAN_DIR)).unwrap();
        fs::write(dir.path().join(CORRECTED_DIR).join("keep.dcm"), b"k").unwrap();
        fs::write(dir.path().join(ORPHAN_DIR).join("drop.dcm"), b"d").unwrap();

        assert!(merge_corrected_volumes(dir.path()).unwrap());

        let mut left: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left, vec!["keep.dcm"]);
    }

    #[test]
    fn test_unexpected_layout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(CORRECTED_DIR)).unwrap();
        fs::create_dir(dir.path().join(ORPHAN_DIR)).unwrap();
        fs::write(dir.path().join("stray.dcm"), b"s").unwrap();

        let err = merge_corrected_volumes(dir.path()).unwrap_err();
        assert!(matches!(err, Error::UnexpectedCorrectionOutput { .. }));
        assert!(dir.path().join(ORPHAN_DIR).exists());
    }
}
