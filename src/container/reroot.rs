// src/container/reroot.rs

//! Lazy prefix rewriting of archive entries
//!
//! Extracting an archive that wraps everything in one top-level directory
//! should not reproduce that directory. `Rerooted` yields the regular-file
//! entries with the prefix cut off, so extraction lands them one level up.

use super::Entry;
use std::slice;

/// Iterator over regular-file entries with a leading directory removed
///
/// Produced by `Container::reroot`. Single pass; the container is untouched.
#[derive(Debug, Clone)]
pub struct Rerooted<'a> {
    entries: slice::Iter<'a, Entry>,
    prefix: String,
}

impl<'a> Rerooted<'a> {
    pub(super) fn new(entries: &'a [Entry], prefix: &str) -> Self {
        Self {
            entries: entries.iter(),
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    fn strip(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            return path.to_string();
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/').to_string(),
            _ => path.to_string(),
        }
    }
}

impl Iterator for Rerooted<'_> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        for entry in self.entries.by_ref() {
            if !entry.is_file {
                continue;
            }
            let path = self.strip(&entry.path);
            return Some(Entry {
                path,
                ..entry.clone()
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new("dicom_single/", 0, true, false, 0),
            Entry::new("dicom_single/image_1.dcm", 4, false, true, 1),
            Entry::new("dicom_single/sub/image_2.dcm", 4, false, true, 2),
            Entry::new("dicom_single_extra/image_3.dcm", 4, false, true, 3),
            Entry::new("dicom_single", 4, false, true, 4),
            Entry::new("dicom_single/link", 0, false, false, 5),
        ]
    }

    #[test]
    fn test_reroot_strips_at_separator_only() {
        let entries = entries();
        let paths: Vec<String> = Rerooted::new(&entries, "dicom_single").map(|e| e.path).collect();
        assert_eq!(
            paths,
            vec![
                "image_1.dcm",
                "sub/image_2.dcm",
                "dicom_single_extra/image_3.dcm",
                "dicom_single",
            ]
        );
    }

    #[test]
    fn test_reroot_trailing_separator_ignored() {
        let entries = entries();
        let with_slash: Vec<Entry> = Rerooted::new(&entries, "dicom_single/").collect();
        let without: Vec<Entry> = Rerooted::new(&entries, "dicom_single").collect();
        assert_eq!(with_slash, without);
    }

    #[test]
    fn test_reroot_keeps_position_and_size() {
        let entries = entries();
        let first = Rerooted::new(&entries, "dicom_single").next().unwrap();
        assert_eq!(first.index(), 1);
        assert_eq!(first.size, 4);
        // Source listing is unchanged
        assert_eq!(entries[1].path, "dicom_single/image_1.dcm");
    }

    #[test]
    fn test_reroot_is_finite() {
        let entries = entries();
        let mut iter = Rerooted::new(&entries, "x");
        assert_eq!(iter.by_ref().count(), 4);
        assert!(iter.next().is_none());
    }
}
