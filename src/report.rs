// src/report.rs

//! Run-scoped reporting handle
//!
//! Every arrangement and resolution call takes a `&dyn Reporter` so that the
//! caller decides where diagnostics go, instead of the library writing to a
//! process-wide logger.
//!
//! # Design
//!
//! The `Reporter` trait defines the interface. Implementations include:
//! - `LogReporter`: forwards to tracing
//! - `SilentReporter`: no-op for scripted/quiet modes
//! - `RecordingReporter`: keeps every event for structured output and tests
//!
//! # Example
//!
//! ```
//! use niiprep::report::{RecordingReporter, Reporter};
//!
//! let reporter = RecordingReporter::new();
//! reporter.step("Establishing input as zip file");
//! assert_eq!(reporter.steps(), vec!["Establishing input as zip file".to_string()]);
//! ```

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Core trait for run diagnostics
pub trait Reporter: Send + Sync {
    /// A milestone in the run
    fn step(&self, message: &str);

    /// A file listing, e.g. the tree before and after flattening
    fn file_tree(&self, label: &str, paths: &[PathBuf]);

    /// Something surprising that does not stop the run
    fn warn(&self, message: &str);
}

/// Silent reporter (no-op)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn step(&self, _message: &str) {}

    fn file_tree(&self, _label: &str, _paths: &[PathBuf]) {}

    fn warn(&self, _message: &str) {}
}

/// Reporter that forwards to tracing
///
/// Steps log at info level; file trees only at debug level since archives
/// can hold thousands of slices.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn step(&self, message: &str) {
        info!("{}", message);
    }

    fn file_tree(&self, label: &str, paths: &[PathBuf]) {
        info!("{}: {} file(s)", label, paths.len());
        for path in paths {
            debug!("  {}", path.display());
        }
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

/// A single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Step(String),
    FileTree { label: String, paths: Vec<PathBuf> },
    Warning(String),
}

/// Reporter that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far, in order
    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    pub fn steps(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Step(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// The most recent file tree recorded under `label`
    pub fn file_tree_for(&self, label: &str) -> Option<Vec<PathBuf>> {
        self.lock().iter().rev().find_map(|event| match event {
            ReportEvent::FileTree { label: l, paths } if l == label => Some(paths.clone()),
            _ => None,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        // A poisoned lock only means a panicking test; the data is still usable
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn step(&self, message: &str) {
        debug!("{}", message);
        self.push(ReportEvent::Step(message.to_string()));
    }

    fn file_tree(&self, label: &str, paths: &[PathBuf]) {
        self.push(ReportEvent::FileTree {
            label: label.to_string(),
            paths: paths.to_vec(),
        });
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
        self.push(ReportEvent::Warning(message.to_string()));
    }
}
