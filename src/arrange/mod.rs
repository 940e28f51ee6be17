// src/arrange/mod.rs

//! Converter input arrangement
//!
//! Turns whatever the user submitted (zip, tarball, header/data pair, single
//! file or directory) into one flat directory the converter can read.
//!
//! # Example
//!
//! ```no_run
//! use niiprep::arrange::prepare_input;
//! use niiprep::report::LogReporter;
//! use std::path::Path;
//!
//! let dir = prepare_input(
//!     Path::new("/flywheel/input/scan.PAR"),
//!     Some(Path::new("/flywheel/input/scan.REC")),
//!     Path::new("/flywheel/work"),
//!     &LogReporter,
//! )?;
//! println!("converter input: {}", dir.display());
//! # Ok::<(), niiprep::Error>(())
//! ```

mod correction;
mod extract;
mod pairing;

pub use correction::{CORRECTED_DIR, ORPHAN_DIR, merge_corrected_volumes};
pub use extract::extract_archive_contents;
pub use pairing::{DATA_EXTENSION, HEADER_EXTENSION, adjust_pair_filenames, check_pairing};

use crate::container::{Container, ContainerFormat, ContainerKind, classify};
use crate::error::{Error, Result};
use crate::filesystem::path::leaf_name;
use crate::filesystem::{copy_flat, has_entries};
use crate::report::Reporter;
use crate::sanitize::sanitize_name;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prepare the converter input directory under `work_root`
///
/// `primary` is the submitted input; `secondary` is the data file of a
/// header/data pair and only consulted when `primary` is not an archive.
/// Returns the prepared directory, which is guaranteed to be non-empty.
pub fn prepare_input(
    primary: &Path,
    secondary: Option<&Path>,
    work_root: &Path,
    reporter: &dyn Reporter,
) -> Result<PathBuf> {
    reporter.step("Arranging converter input");

    let dir = match classify(primary)? {
        ContainerKind::Zip => prepare_archive(primary, ContainerFormat::Zip, work_root, reporter)?,
        ContainerKind::Tar(compression) => {
            prepare_archive(primary, ContainerFormat::Tar(compression), work_root, reporter)?
        }
        ContainerKind::None => match secondary {
            Some(data) => prepare_pair(primary, data, work_root, reporter)?,
            None => prepare_plain(primary, work_root, reporter)?,
        },
    };

    if !has_entries(&dir)? {
        fs::remove_dir_all(&dir)?;
        return Err(Error::EmptyInput(dir));
    }

    info!("Converter input prepared in {}", dir.display());
    Ok(dir)
}

fn prepare_archive(
    path: &Path,
    format: ContainerFormat,
    work_root: &Path,
    reporter: &dyn Reporter,
) -> Result<PathBuf> {
    let container = Container::open(path, format)?;
    container.ensure_not_empty()?;
    extract_archive_contents(&container, work_root, reporter)
}

fn prepare_pair(
    header: &Path,
    data: &Path,
    work_root: &Path,
    reporter: &dyn Reporter,
) -> Result<PathBuf> {
    reporter.step("Establishing input as header/data pair");
    check_pairing(header, data)?;
    fs::metadata(data).map_err(|source| Error::UnreadableInput {
        path: data.to_path_buf(),
        source,
    })?;

    let (dir, stem) = setup_input_dir(work_root, &input_name(header))?;
    for file in [header, data] {
        fs::copy(file, dir.join(input_name(file)))?;
    }
    adjust_pair_filenames(&dir, &stem)?;
    Ok(dir)
}

fn prepare_plain(path: &Path, work_root: &Path, reporter: &dyn Reporter) -> Result<PathBuf> {
    let name = input_name(path);
    let (dir, _) = setup_input_dir(work_root, &name)?;

    if path.is_dir() {
        reporter.step("Copying input directory");
        if let Err(e) = copy_flat(path, &dir) {
            fs::remove_dir_all(&dir)?;
            return Err(e);
        }
    } else {
        reporter.step("Copying input file");
        fs::copy(path, dir.join(&name))?;
    }
    Ok(dir)
}

fn input_name(path: &Path) -> String {
    leaf_name(path).unwrap_or_default()
}

/// Create `work_root/<sanitized name>` and return it with its stem
///
/// The directory must not exist yet.
pub(crate) fn setup_input_dir(work_root: &Path, name: &str) -> Result<(PathBuf, String)> {
    let stem = sanitize_name(name);
    let dir = work_root.join(&stem);
    if dir.exists() {
        return Err(Error::DestinationExists(dir));
    }
    fs::create_dir(&dir)?;
    Ok((dir, stem))
}
