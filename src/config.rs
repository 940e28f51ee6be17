// src/config.rs

//! Resolution configuration
//!
//! Settings are read from an optional TOML file; command-line flags override
//! whatever the file sets.
//!
//! ```toml
//! bids_sidecar = "y"
//! output_nrrd = false
//! pydeface_intermediaries = true
//! modality = "MR"
//!
//! [classification]
//! Intent = ["Structural"]
//! Measurement = ["T1"]
//! ```

use crate::error::Result;
use crate::resolve::{Classification, ResolveOptions, RetentionPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// What to do with the converter's JSON sidecars
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidecarMode {
    /// Keep sidecars next to the images
    #[default]
    #[serde(rename = "y")]
    Yes,
    /// Drop sidecars, keep images
    #[serde(rename = "n")]
    No,
    /// Keep only sidecars
    #[serde(rename = "o")]
    Only,
}

impl FromStr for SidecarMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "y" => Ok(Self::Yes),
            "n" => Ok(Self::No),
            "o" => Ok(Self::Only),
            other => Err(format!("unknown sidecar mode '{}', expected y, n or o", other)),
        }
    }
}

impl fmt::Display for SidecarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yes => "y",
            Self::No => "n",
            Self::Only => "o",
        };
        write!(f, "{}", s)
    }
}

/// Settings for output resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub bids_sidecar: SidecarMode,
    pub ignore_errors: bool,
    pub output_nrrd: bool,
    pub pydeface_intermediaries: bool,
    pub modality: Option<String>,
    pub classification: Option<Classification>,
}

impl ResolveConfig {
    /// Retention derived from the sidecar mode and output format
    ///
    /// NRRD output replaces NIfTI, so NIfTI is never retained alongside it.
    /// Sidecars-only mode retains no image of either format.
    pub fn retention(&self) -> RetentionPolicy {
        let images = self.bids_sidecar != SidecarMode::Only;
        RetentionPolicy {
            retain_sidecar: self.bids_sidecar != SidecarMode::No,
            retain_nifti: images && !self.output_nrrd,
            output_nrrd: images && self.output_nrrd,
        }
    }

    /// Options for `resolve_outputs`
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            policy: self.retention(),
            ignore_errors: self.ignore_errors,
            pydeface_intermediaries: self.pydeface_intermediaries,
            modality: self.modality.clone(),
            classification: self.classification.clone(),
        }
    }
}

/// Parse a configuration from TOML text
pub fn parse_config(content: &str) -> Result<ResolveConfig> {
    Ok(toml::from_str(content)?)
}

/// Load a configuration file
pub fn load_config(path: &Path) -> Result<ResolveConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    debug!("Loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}
