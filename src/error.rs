// src/error.rs

//! Error taxonomy for input arrangement and output resolution
//!
//! Every variant is fatal for the run: callers propagate with `?` and the
//! CLI exits non-zero. A partially prepared input directory must never be
//! handed to the converter.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::compression::CompressionError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed {format} archive {path}: {reason}")]
    MalformedContainer {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },

    #[error("Input archive is empty: {0}")]
    EmptyInput(PathBuf),

    #[error("Unsupported archive packaging in {path}: {reason}")]
    UnsupportedPackaging { path: PathBuf, reason: String },

    #[error("More than one file named {name} in directory tree: {first} and {second}")]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(
        "Invalid header/data pairing: header must end in .par and data in .rec, got {header} and {data}"
    )]
    InvalidPairing { header: PathBuf, data: PathBuf },

    #[error("Unable to read input {path}: {source}")]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Conflicting retention flags: {0}")]
    RetentionConflict(String),

    #[error("Malformed sidecar {path}: {reason}")]
    MalformedSidecar { path: PathBuf, reason: String },

    #[error("Unexpected volume correction output in {path}: {reason}")]
    UnexpectedCorrectionOutput { path: PathBuf, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-friendly tag, used in the CLI's failure line
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::MalformedContainer { .. } => "malformed-container",
            Self::EmptyInput(_) => "empty-input",
            Self::UnsupportedPackaging { .. } => "unsupported-packaging",
            Self::NameCollision { .. } => "name-collision",
            Self::InvalidPairing { .. } => "invalid-pairing",
            Self::UnreadableInput { .. } => "unreadable-input",
            Self::DestinationExists(_) => "destination-exists",
            Self::PathTraversal(_) => "path-traversal",
            Self::InvalidPath(_) => "invalid-path",
            Self::RetentionConflict(_) => "retention-conflict",
            Self::MalformedSidecar { .. } => "malformed-sidecar",
            Self::UnexpectedCorrectionOutput { .. } => "unexpected-correction-output",
            Self::Config(_) => "config",
            Self::Compression(_) => "compression",
        }
    }
}
