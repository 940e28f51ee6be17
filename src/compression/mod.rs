// src/compression/mod.rs
//! Stream compression detection for tar-family inputs
//!
//! Submitted tarballs arrive as `.tgz`, `.tar.xz`, `.tar.zst` or plain `.tar`,
//! and the filename is not trusted. The outer compression layer is identified
//! from the leading bytes of the file and unwrapped before tar parsing.

use std::io::{self, Read};
use thiserror::Error;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to create {format} decoder: {source}")]
    DecoderCreation {
        format: &'static str,
        source: io::Error,
    },
}

/// Outer compression layer of a tar stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Uncompressed tar
    None,
    Gzip,
    Xz,
    Zstd,
}

impl CompressionFormat {
    /// Identify the compression layer from the first bytes of a file
    ///
    /// ```
    /// use niiprep::compression::CompressionFormat;
    ///
    /// assert_eq!(CompressionFormat::from_magic_bytes(&[0x1f, 0x8b, 0x08]), CompressionFormat::Gzip);
    /// assert_eq!(CompressionFormat::from_magic_bytes(b"ustar"), CompressionFormat::None);
    /// ```
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(GZIP_MAGIC) {
            Self::Gzip
        } else if data.starts_with(XZ_MAGIC) {
            Self::Xz
        } else if data.starts_with(ZSTD_MAGIC) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Human-readable name, used in log lines and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tar+gzip",
            Self::Xz => "tar+xz",
            Self::Zstd => "tar+zstd",
        }
    }

    /// Wrap `reader` in the matching decoder
    ///
    /// For `CompressionFormat::None` the reader is returned unchanged.
    pub fn decoder<'a, R: Read + 'a>(
        &self,
        reader: R,
    ) -> Result<Box<dyn Read + 'a>, CompressionError> {
        match self {
            Self::None => Ok(Box::new(reader)),
            Self::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
            Self::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
            Self::Zstd => {
                let decoder =
                    zstd::Decoder::new(reader).map_err(|e| CompressionError::DecoderCreation {
                        format: "zstd",
                        source: e,
                    })?;
                Ok(Box::new(decoder))
            }
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
