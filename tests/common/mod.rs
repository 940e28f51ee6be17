// tests/common/mod.rs

//! Shared fixtures for integration tests.
//!
//! Archives are built at test time so the datasets can be described inline:
//! each dataset is a list of `(entry path, contents)` pairs, with directory
//! entries written as paths ending in `/`.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

pub type Dataset = Vec<(&'static str, Vec<u8>)>;

/// Outer compression of a generated tarball
#[derive(Debug, Clone, Copy)]
pub enum TarCompression {
    None,
    Gzip,
    Xz,
    Zstd,
}

/// Fake slice contents, unique per name
pub fn slice(name: &str) -> Vec<u8> {
    let mut data = b"DICM".to_vec();
    data.extend_from_slice(name.as_bytes());
    data.extend(std::iter::repeat_n(0u8, 64));
    data
}

/// Single series, all files at the archive root
pub fn dicom_single() -> Dataset {
    vec![
        ("image_1.dcm", slice("image_1")),
        ("image_2.dcm", slice("image_2")),
        ("image_3.dcm", slice("image_3")),
    ]
}

/// One top-level directory wrapping the series
pub fn dicom_nested_one_level() -> Dataset {
    vec![
        ("dicom_nested_one_level/", Vec::new()),
        ("dicom_nested_one_level/image_1.dcm", slice("image_1")),
        ("dicom_nested_one_level/image_2.dcm", slice("image_2")),
        ("dicom_nested_one_level/.DS_Store", b"finder".to_vec()),
    ]
}

/// Top-level directory with two levels of subdirectories
pub fn dicom_nested_two_levels() -> Dataset {
    vec![
        ("dicom_nested_two_levels/", Vec::new()),
        ("dicom_nested_two_levels/subdir_0/", Vec::new()),
        ("dicom_nested_two_levels/subdir_0/subdir_00/", Vec::new()),
        ("dicom_nested_two_levels/subdir_0/subdir_00/image_1.dcm", slice("image_1")),
        ("dicom_nested_two_levels/subdir_0/subdir_00/image_2.dcm", slice("image_2")),
        ("dicom_nested_two_levels/subdir_1/", Vec::new()),
        ("dicom_nested_two_levels/subdir_1/subdir_10/", Vec::new()),
        ("dicom_nested_two_levels/subdir_1/subdir_10/image_3.dcm", slice("image_3")),
    ]
}

/// Files at different depths, no explicit directory entries
pub fn dicom_nested_uneven() -> Dataset {
    vec![
        ("dicom_nested_uneven/subdir_0/image_1.dcm", slice("image_1")),
        ("dicom_nested_uneven/subdir_0/subdir_00/image_3.dcm", slice("image_3")),
        ("dicom_nested_uneven/image_2.dcm", slice("image_2")),
    ]
}

/// `dataset` with its last file duplicated under another directory
pub fn with_collision(mut dataset: Dataset, duplicate_at: &'static str) -> Dataset {
    let (_, data) = dataset
        .iter()
        .rev()
        .find(|(name, _)| !name.ends_with('/'))
        .cloned()
        .unwrap();
    dataset.push((duplicate_at, data));
    dataset
}

/// A PAR/REC pair wrapped in one directory
pub fn parrec_single() -> Dataset {
    vec![
        ("parrec_single/", Vec::new()),
        ("parrec_single/Scan 7 T1.PAR", b"# === DATA DESCRIPTION FILE ===".to_vec()),
        ("parrec_single/Scan 7 T1.REC", vec![7u8; 128]),
    ]
}

/// Scratch directory with an empty `work/` inside
pub fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    (dir, work)
}

pub fn write_zip(path: &Path, dataset: &[(&str, Vec<u8>)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in dataset {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

pub fn write_tar(path: &Path, dataset: &[(&str, Vec<u8>)], compression: TarCompression) {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in dataset {
        let mut header = tar::Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            builder.append_data(&mut header, name, std::io::empty()).unwrap();
        } else {
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, data.as_slice()).unwrap();
        }
    }
    let raw = builder.into_inner().unwrap();

    let bytes = match compression {
        TarCompression::None => raw,
        TarCompression::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&raw).unwrap();
            encoder.finish().unwrap()
        }
        TarCompression::Xz => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
            encoder.write_all(&raw).unwrap();
            encoder.finish().unwrap()
        }
        TarCompression::Zstd => zstd::encode_all(raw.as_slice(), 3).unwrap(),
    };
    fs::write(path, bytes).unwrap();
}

/// Leaf name -> contents for every regular file of `dataset`, noise excluded
pub fn expected_leaves(dataset: &[(&str, Vec<u8>)]) -> BTreeMap<String, Vec<u8>> {
    dataset
        .iter()
        .filter(|(name, _)| !name.ends_with('/'))
        .map(|(name, data)| (name.rsplit('/').next().unwrap().to_string(), data.clone()))
        .filter(|(leaf, _)| !niiprep::filesystem::is_excluded(leaf))
        .collect()
}

/// Leaf name -> contents for every file directly in `dir`
///
/// Panics if `dir` holds anything other than regular files.
pub fn flat_contents(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut contents = BTreeMap::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.unwrap();
        assert!(
            entry.file_type().is_file() && entry.depth() == 1,
            "{} is not a top-level regular file",
            entry.path().display()
        );
        contents.insert(
            entry.file_name().to_string_lossy().into_owned(),
            fs::read(entry.path()).unwrap(),
        );
    }
    contents
}
