// src/sanitize.rs

//! Filename to directory-name token
//!
//! The prepared input directory is named after the submitted file (or the
//! archive's first subdirectory). The converter uses that name in its output
//! filenames, so it is reduced to alphanumerics joined by single underscores.

use regex::Regex;
use std::sync::LazyLock;

/// Token used when a name has no alphanumeric characters at all
pub const FALLBACK_NAME: &str = "inputs";

/// Container and header suffixes, stripped in this order
const CONTAINER_SUFFIXES: &[&str] = &[
    ".zip", ".tgz", ".tar.gz", ".tar.xz", ".tar.zst", ".tar", ".par", ".PAR",
];

/// Imaging suffixes, stripped after the container suffixes
const IMAGING_SUFFIXES: &[&str] = &[".dicom", ".dcm", ".parrec"];

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").unwrap());

/// Sanitize a filename into a safe directory-name token
///
/// Suffixes are matched literally rather than through extension splitting,
/// since names such as `dicom.@1.2.D.tgz` carry periods that are not
/// extensions.
///
/// # Examples
///
/// ```
/// use niiprep::sanitize::sanitize_name;
///
/// assert_eq!(sanitize_name("dicom.dcm.tgz"), "dicom");
/// assert_eq!(sanitize_name("dicom.@1.2.D.tgz"), "dicom_1_2_D");
/// assert_eq!(sanitize_name("#!.zip"), "inputs");
/// ```
pub fn sanitize_name(filename: &str) -> String {
    let mut name = filename;

    for suffix in CONTAINER_SUFFIXES.iter().chain(IMAGING_SUFFIXES) {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
        }
    }

    let replaced = NON_ALNUM_RE.replace_all(name, "_");
    let trimmed = replaced.trim_end_matches('_');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}
