// src/cli/mod.rs
//! CLI definitions for niiprep
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! - `prepare` - Arrange a submitted input into the converter's input directory
//! - `resolve` - Describe and relocate converter outputs
//! - `merge-corrected` - Fold incomplete-volume correction output back in
//! - `sanitize` - Show the directory token a filename maps to
//! - `completions` - Generate shell completions

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use niiprep::SidecarMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "niiprep")]
#[command(author, version)]
#[command(about = "Prepare converter input and resolve converter output", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Arrange an archive, header/data pair or file into a flat input directory
    Prepare {
        /// Submitted input: zip, tarball, PAR header, file or directory
        input: PathBuf,

        /// REC data file paired with a PAR header input
        #[arg(long, value_name = "REC")]
        data: Option<PathBuf>,

        /// Working directory the input directory is created in
        #[arg(short, long)]
        work_dir: PathBuf,
    },

    /// Describe converter outputs and move the retained ones
    Resolve(ResolveArgs),

    /// Merge incomplete-volume correction output into an input directory
    MergeCorrected {
        /// Prepared input directory
        dir: PathBuf,
    },

    /// Print the directory token a filename sanitizes to
    Sanitize {
        /// Filename to sanitize
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Directory the converter wrote into
    #[arg(short, long)]
    pub work_dir: PathBuf,

    /// Directory retained outputs are moved to
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Sidecar written by the converter (repeatable)
    #[arg(long = "sidecar", value_name = "FILE")]
    pub sidecars: Vec<PathBuf>,

    /// Image, gradient table or NRRD part written by the converter (repeatable)
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Converter input directory, only reported
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Move every file of the working directory
    #[arg(long)]
    pub ignore_errors: bool,

    /// Sidecar handling: y (keep), n (drop), o (sidecars only)
    #[arg(long, value_name = "MODE")]
    pub bids_sidecar: Option<SidecarMode>,

    /// Converter wrote NRRD instead of NIfTI
    #[arg(long)]
    pub output_nrrd: bool,

    /// Keep defacing mask and transform files
    #[arg(long)]
    pub pydeface_intermediaries: bool,

    /// Modality recorded for every file, overriding the sidecar
    #[arg(long)]
    pub modality: Option<String>,
}
