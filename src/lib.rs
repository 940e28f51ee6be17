// src/lib.rs

//! niiprep: input preparation and output resolution around an image converter
//!
//! Users submit zip archives, compressed tarballs, header/data pairs or plain
//! files. The converter wants one flat directory of source files, and hands
//! back sidecars and images that must be described and relocated.
//!
//! # Architecture
//!
//! - Classification by signature bytes, never by filename
//! - Archives are listed once, then extracted through re-rooted entry views
//! - Nested trees are flattened with leaf-name collision detection
//! - Outputs are matched to sidecars by stem, described in `.metadata.json`,
//!   and moved according to a retention policy
//! - Run diagnostics flow through an explicit `Reporter` handle

pub mod arrange;
pub mod compression;
pub mod config;
pub mod container;
mod error;
pub mod filesystem;
pub mod report;
pub mod resolve;
pub mod sanitize;

pub use arrange::{merge_corrected_volumes, prepare_input};
pub use config::{ResolveConfig, SidecarMode, load_config};
pub use container::{Container, ContainerFormat, ContainerKind, classify};
pub use error::{Error, Result};
pub use report::{LogReporter, RecordingReporter, ReportEvent, Reporter, SilentReporter};
pub use resolve::{
    ConverterOutputs, ResolveOptions, ResolveSummary, RetentionPolicy, associate, resolve_outputs,
};
pub use sanitize::sanitize_name;
