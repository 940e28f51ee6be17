// src/resolve/mod.rs

//! Converter output resolution
//!
//! After conversion the working directory holds sidecars, images, gradient
//! tables and (optionally) defacing intermediaries. Resolution decides which
//! of them are kept, describes the kept files in a metadata document, and
//! moves them into the output directory.

mod associate;
pub mod metadata;

pub use associate::{Association, OutputKind, associate, associated_files, sidecar_stem};
pub use metadata::{Classification, FileType, METADATA_FILE, MetadataDocument};

use crate::error::{Error, Result};
use crate::filesystem::move_file;
use crate::report::Reporter;
use metadata::{Acquisition, SidecarMetadata, read_sidecar, write_document};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which converter outputs survive resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retain_sidecar: bool,
    pub retain_nifti: bool,
    pub output_nrrd: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retain_sidecar: true,
            retain_nifti: true,
            output_nrrd: false,
        }
    }
}

impl RetentionPolicy {
    /// Keep everything the converter can produce in NIfTI mode
    pub fn keep_all() -> Self {
        Self::default()
    }

    /// Reject policies that keep both image formats or nothing at all
    pub fn validate(&self) -> Result<()> {
        if self.retain_nifti && self.output_nrrd {
            return Err(Error::RetentionConflict(
                "NIfTI retention and NRRD output are exclusive".to_string(),
            ));
        }
        if !self.retain_nifti && !self.output_nrrd && !self.retain_sidecar {
            return Err(Error::RetentionConflict(
                "policy retains no converter output".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether outputs of `kind` are kept
    pub fn retains(&self, kind: OutputKind) -> bool {
        match kind {
            OutputKind::Nifti | OutputKind::Bval | OutputKind::Bvec => self.retain_nifti,
            OutputKind::Nrrd => self.output_nrrd,
        }
    }
}

/// File lists reported by the converter run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterOutputs {
    pub sidecars: Vec<PathBuf>,
    /// Images, gradient tables and NRRD parts
    pub images: Vec<PathBuf>,
}

impl ConverterOutputs {
    pub fn is_empty(&self) -> bool {
        self.sidecars.is_empty() && self.images.is_empty()
    }
}

/// Resolution settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    pub policy: RetentionPolicy,
    /// Move every file of the working directory, skipping retention rules
    pub ignore_errors: bool,
    /// Keep the defacing mask and transform next to each sidecar
    pub pydeface_intermediaries: bool,
    pub modality: Option<String>,
    pub classification: Option<Classification>,
}

/// What a resolution run did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveSummary {
    /// Files in the output directory, in move order
    pub moved: Vec<PathBuf>,
    /// The metadata document, once moved
    pub metadata_file: Option<PathBuf>,
    pub document: MetadataDocument,
}

/// One file picked for retention
#[derive(Debug, Clone, PartialEq)]
struct Retained {
    path: PathBuf,
    file_type: FileType,
}

/// Suffixes of defacing intermediaries, appended to the sidecar's file stem
const PYDEFACE_INTERMEDIARIES: [(&str, FileType); 2] = [
    ("_pydeface_mask.nii.gz", FileType::Nifti),
    ("_pydeface.mat", FileType::MatlabData),
];

impl From<OutputKind> for FileType {
    fn from(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Nifti => FileType::Nifti,
            OutputKind::Bval => FileType::Bval,
            OutputKind::Bvec => FileType::Bvec,
            OutputKind::Nrrd => FileType::Nrrd,
        }
    }
}

/// Files kept for one sidecar, in move order
fn retained_for_sidecar(
    sidecar: &Path,
    images: &[PathBuf],
    work_dir: &Path,
    policy: &RetentionPolicy,
    pydeface_intermediaries: bool,
) -> Vec<Retained> {
    let mut retained = Vec::new();

    if policy.retain_sidecar {
        retained.push(Retained {
            path: sidecar.to_path_buf(),
            file_type: FileType::SourceCode,
        });
    }

    retained.extend(
        associated_files(sidecar, images)
            .filter(|a| policy.retains(a.kind))
            .map(|a| Retained {
                path: a.file,
                file_type: a.kind.into(),
            }),
    );

    if pydeface_intermediaries && let Some(stem) = sidecar.file_stem() {
        let stem = stem.to_string_lossy();
        for (suffix, file_type) in PYDEFACE_INTERMEDIARIES {
            let path = work_dir.join(format!("{stem}{suffix}"));
            if path.is_file() {
                retained.push(Retained { path, file_type });
            }
        }
    }

    retained
}

/// Describe and relocate the converter outputs in `work_dir`
///
/// The metadata document is written to `work_dir` first, then the retained
/// files and finally the document itself are moved into `output_dir`. Each
/// file moves at most once, even when several sidecars claim it.
///
/// With `ignore_errors` the document is written on a best-effort basis and
/// every non-directory item of `work_dir` is moved.
pub fn resolve_outputs(
    outputs: &ConverterOutputs,
    work_dir: &Path,
    output_dir: &Path,
    options: &ResolveOptions,
    reporter: &dyn Reporter,
) -> Result<ResolveSummary> {
    if options.ignore_errors {
        return sweep_outputs(outputs, work_dir, output_dir, options, reporter);
    }

    reporter.step("Resolving converter outputs");
    options.policy.validate()?;

    let mut plan: Vec<(PathBuf, Vec<Retained>)> = Vec::with_capacity(outputs.sidecars.len());
    let mut seen = HashSet::new();
    let mut document = MetadataDocument::default();

    for sidecar in &outputs.sidecars {
        let shared = SidecarMetadata::new(
            read_sidecar(sidecar)?,
            options.modality.as_deref(),
            options.classification.as_ref(),
        );
        let retained: Vec<Retained> = retained_for_sidecar(
            sidecar,
            &outputs.images,
            work_dir,
            &options.policy,
            options.pydeface_intermediaries,
        )
        .into_iter()
        .filter(|r| seen.insert(r.path.clone()))
        .collect();

        document
            .acquisition
            .files
            .extend(retained.iter().map(|r| shared.describe(&r.path, r.file_type)));
        plan.push((sidecar.clone(), retained));
    }

    let metadata_path = write_document(&document, work_dir)?;

    let mut moved = Vec::new();
    for (sidecar, retained) in &plan {
        for file in retained {
            moved.push(move_into(&file.path, output_dir)?);
        }
        info!("Resolved {} file(s) for {}", retained.len(), sidecar.display());
    }
    let metadata_file = move_into(&metadata_path, output_dir)?;

    reporter.file_tree("resolved_outputs", &moved);
    info!("Converter outputs resolved: {} file(s) moved", moved.len());

    Ok(ResolveSummary {
        moved,
        metadata_file: Some(metadata_file),
        document,
    })
}

/// Move every non-directory item of `work_dir` into `output_dir`
fn sweep_outputs(
    outputs: &ConverterOutputs,
    work_dir: &Path,
    output_dir: &Path,
    options: &ResolveOptions,
    reporter: &dyn Reporter,
) -> Result<ResolveSummary> {
    reporter.warn("Ignoring errors: moving every file in the working directory");

    let mut document = MetadataDocument::default();
    if !outputs.is_empty() {
        document = best_effort_document(outputs, work_dir, options, reporter);
        write_document(&document, work_dir)?;
    }

    let mut items: Vec<PathBuf> = fs::read_dir(work_dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    items.sort();

    let mut moved = Vec::new();
    let mut metadata_file = None;
    for item in items.into_iter().filter(|p| !p.is_dir()) {
        let target = move_into(&item, output_dir)?;
        if item.file_name().is_some_and(|n| n == METADATA_FILE) {
            metadata_file = Some(target.clone());
        }
        moved.push(target);
    }

    reporter.file_tree("resolved_outputs", &moved);
    Ok(ResolveSummary {
        moved,
        metadata_file,
        document,
    })
}

/// Metadata for everything the converter produced, skipping unreadable sidecars
fn best_effort_document(
    outputs: &ConverterOutputs,
    work_dir: &Path,
    options: &ResolveOptions,
    reporter: &dyn Reporter,
) -> MetadataDocument {
    let policy = RetentionPolicy::keep_all();
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for sidecar in &outputs.sidecars {
        let info = match read_sidecar(sidecar) {
            Ok(info) => info,
            Err(e) => {
                warn!("Skipping metadata for {}: {}", sidecar.display(), e);
                reporter.warn(&format!("Unreadable sidecar {}", sidecar.display()));
                continue;
            }
        };
        let shared = SidecarMetadata::new(
            info,
            options.modality.as_deref(),
            options.classification.as_ref(),
        );
        for retained in retained_for_sidecar(
            sidecar,
            &outputs.images,
            work_dir,
            &policy,
            options.pydeface_intermediaries,
        ) {
            if seen.insert(retained.path.clone()) {
                files.push(shared.describe(&retained.path, retained.file_type));
            }
        }
    }

    MetadataDocument {
        acquisition: Acquisition { files },
    }
}

fn move_into(path: &Path, dir: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::InvalidPath(format!("no file name in {}", path.display())))?;
    let target = dir.join(name);
    move_file(path, &target)?;
    Ok(target)
}
