// src/resolve/associate.rs

//! Sidecar to output file association
//!
//! The converter writes one JSON sidecar per series and names every output of
//! that series after the same stem. An output belongs to a sidecar when its
//! path is the sidecar's stem followed by exactly one known extension.

use std::path::{Path, PathBuf};

const SIDECAR_EXTENSION: &str = ".json";

/// Kind of converter output a sidecar can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Nifti,
    Bval,
    Bvec,
    /// Detached header, raw payload or attached NRRD
    Nrrd,
}

impl OutputKind {
    /// Extensions that, following the stem exactly, mark an output of this kind
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Nifti => &[".nii.gz", ".nii"],
            Self::Bval => &[".bval"],
            Self::Bvec => &[".bvec"],
            Self::Nrrd => &[".raw.gz", ".nhdr", ".nrrd"],
        }
    }

    /// File type recorded in the metadata document
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nifti => "nifti",
            Self::Bval => "bval",
            Self::Bvec => "bvec",
            Self::Nrrd => "nrrd",
        }
    }

    fn from_remainder(remainder: &str) -> Option<Self> {
        [Self::Nifti, Self::Bval, Self::Bvec, Self::Nrrd]
            .into_iter()
            .find(|kind| kind.extensions().contains(&remainder))
    }
}

/// One output file owned by one sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub sidecar: PathBuf,
    pub file: PathBuf,
    pub kind: OutputKind,
}

/// Sidecar path text up to the first `.json`
///
/// ```
/// use niiprep::resolve::sidecar_stem;
/// use std::path::Path;
///
/// assert_eq!(sidecar_stem(Path::new("/work/T1_MPRAGE_e2.json")), "/work/T1_MPRAGE_e2");
/// ```
pub fn sidecar_stem(sidecar: &Path) -> String {
    let text = sidecar.to_string_lossy();
    match text.split_once(SIDECAR_EXTENSION) {
        Some((stem, _)) => stem.to_string(),
        None => text.into_owned(),
    }
}

/// Outputs of one sidecar, in `produced` order
pub fn associated_files<'a>(
    sidecar: &'a Path,
    produced: &'a [PathBuf],
) -> impl Iterator<Item = Association> + 'a {
    let stem = sidecar_stem(sidecar);
    produced.iter().filter_map(move |file| {
        let text = file.to_string_lossy();
        let (_, remainder) = text.split_once(stem.as_str())?;
        let kind = OutputKind::from_remainder(remainder)?;
        Some(Association {
            sidecar: sidecar.to_path_buf(),
            file: file.clone(),
            kind,
        })
    })
}

/// Pair every produced file with the sidecar that owns it
///
/// Grouped by sidecar in input order. Files owned by no sidecar are left
/// out; a file is listed once per sidecar that owns it.
pub fn associate(sidecars: &[PathBuf], produced: &[PathBuf]) -> Vec<Association> {
    sidecars
        .iter()
        .flat_map(|sidecar| associated_files(sidecar, produced))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_sidecar_stem() {
        assert_eq!(sidecar_stem(Path::new("/w/dwi.json")), "/w/dwi");
        assert_eq!(sidecar_stem(Path::new("/w/a.json.bak")), "/w/a");
        assert_eq!(sidecar_stem(Path::new("/w/noext")), "/w/noext");
    }

    #[test]
    fn test_associate_by_exact_remainder() {
        let sidecars = paths(&["/w/dwi.json"]);
        let produced = paths(&[
            "/w/dwi.nii.gz",
            "/w/dwi.bval",
            "/w/dwi.bvec",
            "/w/dwi_ADC.nii.gz",
            "/w/dwi.nii.gz.bak",
            "/w/other.nii",
        ]);

        let found = associate(&sidecars, &produced);

        let kinds: Vec<_> = found.iter().map(|a| (a.file.clone(), a.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (PathBuf::from("/w/dwi.nii.gz"), OutputKind::Nifti),
                (PathBuf::from("/w/dwi.bval"), OutputKind::Bval),
                (PathBuf::from("/w/dwi.bvec"), OutputKind::Bvec),
            ]
        );
        assert!(found.iter().all(|a| a.sidecar == Path::new("/w/dwi.json")));
    }

    #[test]
    fn test_associate_nrrd_outputs() {
        let sidecars = paths(&["/w/t1.json"]);
        let produced = paths(&["/w/t1.nhdr", "/w/t1.raw.gz", "/w/t1.nrrd", "/w/t1.raw"]);

        let found = associate(&sidecars, &produced);

        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|a| a.kind == OutputKind::Nrrd));
    }

    #[test]
    fn test_associate_multiple_sidecars() {
        let sidecars = paths(&["/w/t1_e1.json", "/w/t1_e2.json"]);
        let produced = paths(&["/w/t1_e2.nii", "/w/t1_e1.nii"]);

        let found = associate(&sidecars, &produced);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].file, PathBuf::from("/w/t1_e1.nii"));
        assert_eq!(found[1].file, PathBuf::from("/w/t1_e2.nii"));
    }

    #[test]
    fn test_associate_is_idempotent() {
        let sidecars = paths(&["/w/a.json", "/w/b.json"]);
        let produced = paths(&["/w/a.nii.gz", "/w/b.bval", "/w/c.nii"]);

        let first = associate(&sidecars, &produced);
        let second = associate(&sidecars, &produced);
        assert_eq!(first, second);
        assert!(associate(&[], &produced).is_empty());
        assert!(associate(&sidecars, &[]).is_empty());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(OutputKind::Nifti.type_name(), "nifti");
        assert_eq!(OutputKind::Nrrd.type_name(), "nrrd");
    }
}
