//! Merge report
//!
//! Summary of one merge invocation, serialized as RFC 8785 canonical JSON so
//! identical runs print identical reports.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Diagnostic, MergePhase};
use crate::archive::WalkStats;

/// Kind of merged resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Properties,
    LineSet,
}

/// One resource written by the output writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedResource {
    pub path: String,
    pub kind: ResourceKind,

    /// Contributing archives, sorted
    pub origins: Vec<String>,

    /// Copy in the class-output directory (absent when that location is a directory)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loose_path: Option<PathBuf>,

    /// Copy in the shared settings directory (absent when the entry has no usable file name)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub settings_path: Option<PathBuf>,

    /// Keys or lines written
    pub entries: usize,
}

/// One walked archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub id: String,
    pub path: PathBuf,
    pub primary: bool,
    pub stats: WalkStats,
}

/// Report of a merge run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub phase: MergePhase,
    pub primary: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub merged_archive: Option<PathBuf>,

    /// SHA-256 of the committed merged jar
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub merged_archive_sha256: Option<String>,

    /// Passthrough entries copied into the merged jar
    pub passthrough_entries: usize,

    /// Archives in walk order, primary first
    pub archives: Vec<ArchiveSummary>,

    /// Resources in flush order
    pub merged_resources: Vec<MergedResource>,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Report serialization errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("JCS serialization failed: {0}")]
    Jcs(String),

    #[error("Canonical JSON is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl MergeReport {
    /// Number of merged properties and line-set resources
    pub fn merged_resource_count(&self) -> usize {
        self.merged_resources.len()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Serialize with RFC 8785 JSON Canonicalization Scheme (JCS)
    pub fn to_canonical_json(&self) -> Result<String, ReportError> {
        let bytes = serde_json_canonicalizer::to_vec(self)
            .map_err(|e| ReportError::Jcs(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Write the canonical form to `path`
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_canonical_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }
}

impl std::fmt::Display for MergeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Merge Report ===")?;
        writeln!(f)?;
        writeln!(f, "Phase: {:?}", self.phase)?;
        writeln!(f, "Primary: {}", self.primary.display())?;
        match &self.merged_archive {
            Some(path) => writeln!(
                f,
                "Merged jar: {} ({} passthrough entries)",
                path.display(),
                self.passthrough_entries
            )?,
            None => writeln!(f, "Merged jar: (disabled)")?,
        }
        writeln!(f)?;
        writeln!(f, "Archives ({}):", self.archives.len())?;
        for archive in &self.archives {
            writeln!(
                f,
                "  {}{} - {} entries, {} copied, {} skipped",
                archive.id,
                if archive.primary { " (primary)" } else { "" },
                archive.stats.entries,
                archive.stats.copied,
                archive.stats.skipped
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Merged resources ({}):", self.merged_resource_count())?;
        for resource in &self.merged_resources {
            writeln!(
                f,
                "  {} [{}] from {}",
                resource.path,
                resource.entries,
                resource.origins.join(", ")
            )?;
        }
        if self.has_diagnostics() {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", self.diagnostics.len())?;
            for diagnostic in &self.diagnostics {
                writeln!(f, "  {}", diagnostic.message())?;
            }
        }
        Ok(())
    }
}
