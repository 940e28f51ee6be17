// src/arrange/extract.rs

//! Archive extraction into a flat prepared directory

use super::pairing::{HEADER_EXTENSION, adjust_pair_filenames};
use super::setup_input_dir;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::filesystem::flatten_directory;
use crate::report::Reporter;
use crate::sanitize::sanitize_name;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Suffix of the scratch directory an archive is unpacked into before flattening
const STAGING_SUFFIX: &str = "_staging";

/// Extract `container` into a new directory under `work_root`
///
/// An archive without directories is extracted as-is into a directory named
/// after the archive. Otherwise the directory is named after the first
/// top-level directory: entries under it are re-rooted, everything is
/// unpacked into a staging directory, and the staging tree is flattened into
/// the prepared directory. Header/data files are renamed to the prepared
/// directory's name when the archive holds a header.
pub fn extract_archive_contents(
    container: &Container,
    work_root: &Path,
    reporter: &dyn Reporter,
) -> Result<PathBuf> {
    let top_level = container.top_level_dirs();
    debug!("Top-level directories in {}: {:?}", container.path().display(), top_level);

    let (target, stem) = match top_level.first() {
        None => {
            reporter.step("Extracting flat archive");
            let (target, stem) = setup_input_dir(work_root, &container.file_name())?;
            let written = container.extract_all(&target);
            finish_or_remove(&target, written.and_then(|n| require_files(container, n)))?;
            (target, stem)
        }
        Some(first) => {
            reporter.step("Extracting and flattening nested archive");
            let stem = sanitize_name(first);
            let target = work_root.join(&stem);
            let staging = work_root.join(format!("{stem}{STAGING_SUFFIX}"));

            for stale in [&target, &staging] {
                if stale.exists() {
                    reporter.warn(&format!("Removing stale directory {}", stale.display()));
                    fs::remove_dir_all(stale)?;
                }
            }
            fs::create_dir(&staging)?;

            let result = stage_and_flatten(container, first, &staging, &target, reporter);
            let cleanup = fs::remove_dir_all(&staging);
            finish_or_remove(&target, result)?;
            cleanup?;
            (target, stem)
        }
    };

    if container.contains_extension(HEADER_EXTENSION) {
        let renamed = adjust_pair_filenames(&target, &stem).map(|_| ());
        finish_or_remove(&target, renamed)?;
    }

    info!("Extracted {} into {}", container.file_name(), target.display());
    Ok(target)
}

fn stage_and_flatten(
    container: &Container,
    prefix: &str,
    staging: &Path,
    target: &Path,
    reporter: &dyn Reporter,
) -> Result<()> {
    let written = container.extract(staging, container.reroot(prefix))?;
    require_files(container, written)?;
    flatten_directory(staging, target, false, reporter)?;
    Ok(())
}

fn require_files(container: &Container, written: usize) -> Result<()> {
    if written == 0 {
        return Err(Error::UnsupportedPackaging {
            path: container.path().to_path_buf(),
            reason: "no regular files found in archive".to_string(),
        });
    }
    Ok(())
}

/// Remove a half-built prepared directory when `result` is an error
fn finish_or_remove(target: &Path, result: Result<()>) -> Result<()> {
    if result.is_err() && target.exists() {
        debug!("Removing incomplete directory {}", target.display());
        fs::remove_dir_all(target)?;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerFormat;
    use crate::report::{RecordingReporter, SilentReporter};
    use std::fs::File;
    use std::io::Write;

    fn build_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut writer = ::zip::ZipWriter::new(File::create(path).unwrap());
        let options = ::zip::write::SimpleFileOptions::default()
            .compression_method(::zip::CompressionMethod::Stored);
        for (name, data) in files {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    fn open(path: &Path) -> Container {
        Container::open(path, ContainerFormat::Zip).unwrap()
    }

    #[test]
    fn test_flat_archive_named_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("dicom_single.dicom.zip");
        build_zip(&archive, &[("image_1.dcm", b"1"), ("image_2.dcm", b"2")]);
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();

        let target = extract_archive_contents(&open(&archive), &work, &SilentReporter).unwrap();

        assert_eq!(target, work.join("dicom_single"));
        assert_eq!(fs::read(target.join("image_2.dcm")).unwrap(), b"2");
    }

    #[test]
    fn test_nested_archive_flattened_and_staging_removed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("upload.zip");
        build_zip(
            &archive,
            &[
                ("series one/", b""),
                ("series one/a/image_1.dcm", b"1"),
                ("series one/b/image_2.dcm", b"2"),
                ("other/image_3.dcm", b"3"),
            ],
        );
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();
        let reporter = RecordingReporter::new();

        let target = extract_archive_contents(&open(&archive), &work, &reporter).unwrap();

        assert_eq!(target, work.join("series_one"));
        let mut names: Vec<_> = fs::read_dir(&target)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["image_1.dcm", "image_2.dcm", "image_3.dcm"]);
        assert!(!work.join("series_one_staging").exists());
        assert!(reporter.file_tree_for("file_tree_target").is_some());
    }

    #[test]
    fn test_collision_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("upload.zip");
        build_zip(&archive, &[("s/a/image.dcm", b"1"), ("s/b/image.dcm", b"2")]);
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();

        let err = extract_archive_contents(&open(&archive), &work, &SilentReporter).unwrap_err();

        assert!(matches!(err, Error::NameCollision { .. }));
        assert!(!work.join("s").exists());
        assert!(!work.join("s_staging").exists());
    }

    #[test]
    fn test_directories_only_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("dirs.zip");
        build_zip(&archive, &[("only/", b""), ("only/dirs/", b"")]);
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();

        let err = extract_archive_contents(&open(&archive), &work, &SilentReporter).unwrap_err();

        assert!(matches!(err, Error::UnsupportedPackaging { .. }));
        assert!(!work.join("only").exists());
    }

    #[test]
    fn test_header_in_archive_triggers_rename() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("parrec.zip");
        build_zip(&archive, &[("Brain/Scan.PAR", b"h"), ("Brain/Scan.REC", b"d")]);
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();

        let target = extract_archive_contents(&open(&archive), &work, &SilentReporter).unwrap();

        assert!(target.join("Brain.par").exists());
        assert!(target.join("Brain.rec").exists());
    }

    #[test]
    fn test_failed_rename_removes_prepared_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("parrec.zip");
        build_zip(&archive, &[("Brain/a.PAR", b"h1"), ("Brain/b.PAR", b"h2")]);
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();

        let err = extract_archive_contents(&open(&archive), &work, &SilentReporter).unwrap_err();

        assert!(matches!(err, Error::NameCollision { .. }));
        assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
    }

    #[test]
    fn test_root_file_and_nested_file_with_same_name_collide() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("upload.zip");
        build_zip(
            &archive,
            &[("image_1.dcm", b"ROOT"), ("series/", b""), ("series/image_1.dcm", b"NESTED")],
        );
        let work = dir.path().join("work");
        fs::create_dir(&work).unwrap();

        let err = extract_archive_contents(&open(&archive), &work, &SilentReporter).unwrap_err();

        assert!(matches!(err, Error::NameCollision { .. }), "{err:?}");
        assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
    }
}
