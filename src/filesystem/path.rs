// src/filesystem/path.rs

//! Path sanitization for archive entries
//!
//! Entry names come from user-submitted archives and are joined onto the
//! working root during extraction. A name must never resolve outside the
//! directory it is extracted into.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Turn an archive entry name into a relative path
///
/// This function:
/// 1. Treats `\` as a separator (zip files written on Windows)
/// 2. Skips `.` components and leading slashes
/// 3. Rejects `..` components
/// 4. Rejects names that are empty after normalization
///
/// # Examples
///
/// ```
/// use niiprep::filesystem::path::sanitize_entry_path;
/// use std::path::PathBuf;
///
/// assert_eq!(sanitize_entry_path("./scan/IM0001").unwrap(), PathBuf::from("scan/IM0001"));
/// assert_eq!(sanitize_entry_path("scan\\IM0001").unwrap(), PathBuf::from("scan/IM0001"));
/// assert!(sanitize_entry_path("../etc/passwd").is_err());
/// ```
pub fn sanitize_entry_path(name: &str) -> Result<PathBuf> {
    let unified = name.replace('\\', "/");
    let relative = unified.trim_start_matches('/');

    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir => return Err(Error::PathTraversal(name.to_string())),
            Component::Prefix(_) | Component::RootDir => {}
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::InvalidPath(format!(
            "Empty archive entry name after sanitization: {:?}",
            name
        )));
    }

    Ok(normalized)
}

/// Join an untrusted entry name onto `root`
///
/// ```
/// use niiprep::filesystem::path::safe_join;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/work/staging");
/// assert_eq!(safe_join(root, "a/b.dcm").unwrap(), PathBuf::from("/work/staging/a/b.dcm"));
/// assert!(safe_join(root, "a/../../b.dcm").is_err());
/// ```
pub fn safe_join(root: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    let root = root.as_ref();
    let joined = root.join(sanitize_entry_path(name)?);

    // Catches symlinked parents that already exist on disk
    if let (Ok(canonical_root), Some(parent)) = (root.canonicalize(), joined.parent())
        && let Ok(canonical_parent) = parent.canonicalize()
        && !canonical_parent.starts_with(&canonical_root)
    {
        return Err(Error::PathTraversal(format!(
            "{} escapes {}",
            joined.display(),
            root.display()
        )));
    }

    Ok(joined)
}

/// Leaf name of a path as an owned string
pub fn leaf_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Case-insensitive extension check, `ext` given without the dot
pub fn has_extension(path: impl AsRef<Path>, ext: &str) -> bool {
    path.as_ref()
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
