// src/resolve/metadata.rs

//! Metadata document for retained outputs
//!
//! Every retained file is described by one entry carrying the contents of
//! its sidecar. The document is written next to the outputs as
//! `.metadata.json` and moved with them.

use crate::error::{Error, Result};
use crate::filesystem::path::leaf_name;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Filename of the metadata document
pub const METADATA_FILE: &str = ".metadata.json";

/// Classification labels, keyed by classification dimension
pub type Classification = BTreeMap<String, Vec<String>>;

/// Type tag of a described file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "source code")]
    SourceCode,
    #[serde(rename = "nifti")]
    Nifti,
    #[serde(rename = "bval")]
    Bval,
    #[serde(rename = "bvec")]
    Bvec,
    #[serde(rename = "nrrd")]
    Nrrd,
    #[serde(rename = "MATLAB data")]
    MatlabData,
}

/// One entry of the metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Leaf name of the file
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    pub info: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub files: Vec<FileMetadata>,
}

/// `{"acquisition": {"files": [...]}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub acquisition: Acquisition,
}

/// Metadata shared by every file of one sidecar
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarMetadata {
    pub info: Map<String, Value>,
    pub modality: Option<String>,
    pub classification: Option<Classification>,
}

impl SidecarMetadata {
    /// Build from a parsed sidecar
    ///
    /// `modality` overrides the sidecar's `Modality` field. Without any
    /// modality the classification is dropped too.
    pub fn new(
        info: Map<String, Value>,
        modality: Option<&str>,
        classification: Option<&Classification>,
    ) -> Self {
        let modality = modality.map(str::to_string).or_else(|| {
            info.get("Modality")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        let classification = modality.as_ref().and(classification.cloned());
        Self {
            info,
            modality,
            classification,
        }
    }

    /// Describe `path` with this sidecar's metadata
    pub fn describe(&self, path: &Path, file_type: FileType) -> FileMetadata {
        FileMetadata {
            name: leaf_name(path).unwrap_or_default(),
            file_type,
            classification: self.classification.clone(),
            info: self.info.clone(),
            modality: self.modality.clone(),
        }
    }
}

/// Read a sidecar as a JSON object
///
/// Converter sidecars occasionally carry raw control characters inside
/// strings (copied from scanner text fields) and text that is not UTF-8.
/// Control characters are escaped and non-UTF-8 input is decoded as
/// Latin-1 before parsing.
pub fn read_sidecar(path: &Path) -> Result<Map<String, Value>> {
    let bytes = fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Sidecar {} is not UTF-8, decoding as Latin-1", path.display());
            e.into_bytes().iter().map(|&b| char::from(b)).collect()
        }
    };

    let malformed = |reason: String| Error::MalformedSidecar {
        path: path.to_path_buf(),
        reason,
    };

    match serde_json::from_str(&escape_control_chars(&text)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(malformed(format!("expected a JSON object, found {}", json_kind(&other)))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Escape control characters that appear inside JSON strings
fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if (c as u32) < 0x20 {
                out.push_str(&format!("\\u{:04x}", c as u32));
                continue;
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

/// Write `document` to `<dir>/.metadata.json`
pub fn write_document(document: &MetadataDocument, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(METADATA_FILE);
    let json = serde_json::to_string(document).map_err(std::io::Error::from)?;
    fs::write(&path, json)?;
    info!(
        "Wrote metadata for {} file(s) to {}",
        document.acquisition.files.len(),
        path.display()
    );
    Ok(path)
}
