// src/container/classify.rs

//! Signature-based container classification
//!
//! The submitted filename is not trusted: a `.zip` may be a tarball and a
//! `.dcm` may be a zip. Classification reads the leading bytes only.

use super::ContainerFormat;
use crate::compression::CompressionFormat;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Size of one tar header block
const BLOCK_SIZE: usize = 512;

/// Two zero blocks mark the end of a tar stream; alone they are an empty tarball
const END_OF_ARCHIVE: usize = 2 * BLOCK_SIZE;

/// Local file header, empty archive (end of central directory), spanned archive
const ZIP_SIGNATURES: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

/// Byte range of the octal checksum field in a tar header
const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// What an input path turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Zip,
    Tar(CompressionFormat),
    /// Not an archive: a plain file or a directory
    None,
}

impl ContainerKind {
    /// Format to open the input with, if it is a container
    pub fn format(&self) -> Option<ContainerFormat> {
        match self {
            Self::Zip => Some(ContainerFormat::Zip),
            Self::Tar(compression) => Some(ContainerFormat::Tar(*compression)),
            Self::None => None,
        }
    }
}

/// Whether `head` starts with one of the zip signatures
pub fn is_zip_signature(head: &[u8]) -> bool {
    ZIP_SIGNATURES.iter().any(|sig| head.starts_with(sig))
}

/// Whether `block` is a tar header with a valid checksum
///
/// The stored checksum is the sum of all header bytes with the checksum
/// field itself counted as spaces. Some old writers summed signed bytes, so
/// both sums are accepted. An all-zero block is not a header.
pub fn is_tar_header(block: &[u8]) -> bool {
    if block.len() < BLOCK_SIZE {
        return false;
    }
    let block = &block[..BLOCK_SIZE];
    if block.iter().all(|&b| b == 0) {
        return false;
    }

    let Some(stored) = parse_octal(&block[CHECKSUM_FIELD]) else {
        return false;
    };

    let (mut unsigned, mut signed) = (0i64, 0i64);
    for (i, &b) in block.iter().enumerate() {
        let b = if CHECKSUM_FIELD.contains(&i) { b' ' } else { b };
        unsigned += i64::from(b);
        signed += i64::from(b as i8);
    }

    stored == unsigned || stored == signed
}

fn parse_octal(field: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(field).ok()?;
    let digits = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if digits.is_empty() {
        return None;
    }
    i64::from_str_radix(digits, 8).ok()
}

/// Classify the input at `path` by its signature bytes
///
/// Directories classify as `ContainerKind::None`. A path that cannot be
/// stat'ed, opened or read is `Error::UnreadableInput`.
pub fn classify(path: impl AsRef<Path>) -> Result<ContainerKind> {
    let path = path.as_ref();
    let unreadable = |source: io::Error| Error::UnreadableInput {
        path: path.to_path_buf(),
        source,
    };

    if fs::metadata(path).map_err(unreadable)?.is_dir() {
        debug!("{} is a directory, not a container", path.display());
        return Ok(ContainerKind::None);
    }

    let head = read_head(File::open(path).map_err(unreadable)?, END_OF_ARCHIVE)
        .map_err(unreadable)?;

    let kind = if is_zip_signature(&head) {
        ContainerKind::Zip
    } else {
        let compression = CompressionFormat::from_magic_bytes(&head);
        if compression.is_compressed() {
            classify_compressed(path, compression)
        } else if is_tar_header(&head) || is_end_of_archive(&head) {
            ContainerKind::Tar(CompressionFormat::None)
        } else {
            ContainerKind::None
        }
    };

    debug!("Classified {} as {:?}", path.display(), kind);
    Ok(kind)
}

/// Decode the first block of a compressed stream and look for a tar header
///
/// A stream that fails to decode is treated as a plain compressed file. An
/// all-zero first block is the end-of-archive marker of an empty tarball,
/// which is still a tar (the emptiness guard rejects it later).
fn classify_compressed(path: &Path, compression: CompressionFormat) -> ContainerKind {
    let block = File::open(path)
        .ok()
        .and_then(|file| compression.decoder(file).ok())
        .and_then(|decoder| read_head(decoder, BLOCK_SIZE).ok());

    match block {
        Some(block)
            if block.len() == BLOCK_SIZE
                && (block.iter().all(|&b| b == 0) || is_tar_header(&block)) =>
        {
            ContainerKind::Tar(compression)
        }
        _ => {
            debug!(
                "{} is {} compressed but holds no tar stream",
                path.display(),
                compression
            );
            ContainerKind::None
        }
    }
}

/// Whether `head` is the all-zero end-of-archive marker of an empty tarball
fn is_end_of_archive(head: &[u8]) -> bool {
    head.len() == END_OF_ARCHIVE && head.iter().all(|&b| b == 0)
}

fn read_head<R: Read>(reader: R, len: usize) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut head)?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = ::tar::Builder::new(Vec::new());
        for (name, data) in files {
            let mut header = ::tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn write_file(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_zip_signatures() {
        assert!(is_zip_signature(b"PK\x03\x04rest"));
        assert!(is_zip_signature(b"PK\x05\x06"));
        assert!(is_zip_signature(b"PK\x07\x08"));
        assert!(!is_zip_signature(b"PK\x01\x02"));
        assert!(!is_zip_signature(b"PK"));
    }

    #[test]
    fn test_tar_header_checksum() {
        let bytes = tar_bytes(&[("a.dcm", b"data")]);
        assert!(is_tar_header(&bytes[..BLOCK_SIZE]));

        let mut corrupted = bytes[..BLOCK_SIZE].to_vec();
        corrupted[0] ^= 0x55;
        assert!(!is_tar_header(&corrupted));

        assert!(!is_tar_header(&[0u8; BLOCK_SIZE]));
        assert!(!is_tar_header(&bytes[..100]));
    }

    #[test]
    fn test_classify_by_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = write_file(dir.path(), "looks_like.zip", &tar_bytes(&[("a.dcm", b"x")]));
        assert_eq!(classify(&tarball).unwrap(), ContainerKind::Tar(CompressionFormat::None));

        let zipped = write_file(dir.path(), "image.dcm", b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0");
        assert_eq!(classify(&zipped).unwrap(), ContainerKind::Zip);
    }

    #[test]
    fn test_classify_compressed_tar() {
        let dir = tempfile::tempdir().unwrap();
        let tgz = write_file(dir.path(), "in.tgz", &gzip(&tar_bytes(&[("s/a.dcm", b"x")])));
        assert_eq!(classify(&tgz).unwrap(), ContainerKind::Tar(CompressionFormat::Gzip));
    }

    #[test]
    fn test_classify_empty_compressed_tar() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(dir.path(), "empty.tar.gz", &gzip(&tar_bytes(&[])));
        assert_eq!(classify(&empty).unwrap(), ContainerKind::Tar(CompressionFormat::Gzip));
    }

    #[test]
    fn test_classify_empty_plain_tar() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(dir.path(), "empty.tar", &tar_bytes(&[]));
        assert_eq!(classify(&empty).unwrap(), ContainerKind::Tar(CompressionFormat::None));

        // Record padding after the marker does not change anything
        let padded = write_file(dir.path(), "padded.tar", &[0u8; 10240]);
        assert_eq!(classify(&padded).unwrap(), ContainerKind::Tar(CompressionFormat::None));
    }

    #[test]
    fn test_classify_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let gz = write_file(dir.path(), "image.nii.gz", &gzip(b"not a tar stream"));
        assert_eq!(classify(&gz).unwrap(), ContainerKind::None);

        let par = write_file(dir.path(), "scan.PAR", b"# header text");
        assert_eq!(classify(&par).unwrap(), ContainerKind::None);

        let zeros = write_file(dir.path(), "zeros.bin", &[0u8; BLOCK_SIZE]);
        assert_eq!(classify(&zeros).unwrap(), ContainerKind::None);

        let broken_gz = write_file(dir.path(), "broken.gz", &[0x1f, 0x8b, 0x00]);
        assert_eq!(classify(&broken_gz).unwrap(), ContainerKind::None);
    }

    #[test]
    fn test_classify_directory_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(classify(dir.path()).unwrap(), ContainerKind::None);
        assert!(matches!(
            classify(dir.path().join("absent.zip")),
            Err(Error::UnreadableInput { .. })
        ));
    }

    #[test]
    fn test_kind_format() {
        assert_eq!(ContainerKind::Zip.format(), Some(ContainerFormat::Zip));
        assert_eq!(
            ContainerKind::Tar(CompressionFormat::Xz).format(),
            Some(ContainerFormat::Tar(CompressionFormat::Xz))
        );
        assert_eq!(ContainerKind::None.format(), None);
    }
}
