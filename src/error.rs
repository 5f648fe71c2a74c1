//! Fatal errors of a merge run.
//!
//! Anything in here aborts the whole run. Overlapping keys and duplicate
//! entries are not errors; they are [`crate::run::Diagnostic`]s.

use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::resolve::ResolveError;
use crate::run::MergePhase;

/// Errors that abort a merge run
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] ResolveError),

    #[error("Failed to read {} in {archive}: {source}", .entry.as_deref().unwrap_or("archive"))]
    ArchiveRead {
        archive: String,
        entry: Option<String>,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {} to {}: {source}", .entry.as_deref().unwrap_or("archive"), .target.display())]
    ArchiveWrite {
        target: PathBuf,
        entry: Option<String>,
        #[source]
        source: io::Error,
    },

    #[error("Could not read existing output {}: {source}", .path.display())]
    OutputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: MergePhase, to: MergePhase },
}

impl MergeError {
    pub(crate) fn read(archive: &str, entry: Option<&str>, source: io::Error) -> Self {
        MergeError::ArchiveRead {
            archive: archive.to_string(),
            entry: entry.map(str::to_string),
            source,
        }
    }

    pub(crate) fn write(target: impl Into<PathBuf>, entry: Option<&str>, source: io::Error) -> Self {
        MergeError::ArchiveWrite {
            target: target.into(),
            entry: entry.map(str::to_string),
            source,
        }
    }
}

/// Flatten a zip error into an io error, keeping the underlying io error when there is one
pub(crate) fn zip_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
