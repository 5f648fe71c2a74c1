//! Merge orchestration
//!
//! Drives one merge invocation through its phases:
//! - INIT validates settings and locations before any output is touched
//! - RESOLVING_INPUTS asks the resolver for dependency archives and drops
//!   test/provided scopes and non-jar inputs
//! - PROCESSING_PRIMARY walks the primary artifact first
//! - PROCESSING_DEPENDENCIES walks dependencies in resolved order
//! - FLUSHING writes merged resources and commits the merged jar
//!
//! Any error moves the run to FAILED; the partial merged jar is removed
//! before the error is returned.

mod diagnostic;
mod merge_run;
mod phase;
mod report;

pub use diagnostic::{Diagnostic, Diagnostics};
pub use merge_run::MergeRun;
pub use phase::MergePhase;
pub use report::{ArchiveSummary, MergeReport, MergedResource, ReportError, ResourceKind};

use std::fs;
use std::path::{Path, PathBuf};

use classpath_classifier::ClassifierConfig;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::archive::{read_manifest, ArchiveWalker, JarManifest, MergedArchive};
use crate::config::{ConfigError, MergeSettings};
use crate::error::MergeError;
use crate::output::OutputWriter;
use crate::resolve::{participating_archives, DependencyResolver};

/// Manifest attribute naming the entry point
pub const MAIN_CLASS_ATTRIBUTE: &str = "Main-Class";

/// Where the build put its outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Archive built from the current project
    pub primary_artifact: PathBuf,

    /// Loose class-output directory
    pub classes_dir: PathBuf,

    /// Directory receiving the merged jar
    pub output_dir: PathBuf,
}

impl BuildLayout {
    /// Layout with the merged jar next to the primary artifact
    pub fn new(primary_artifact: impl Into<PathBuf>, classes_dir: impl Into<PathBuf>) -> Self {
        let primary_artifact = primary_artifact.into();
        let output_dir = primary_artifact
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            primary_artifact,
            classes_dir: classes_dir.into(),
            output_dir,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

/// Runs merges for one build
pub struct MergeOrchestrator<R: DependencyResolver> {
    settings: MergeSettings,
    classifier: ClassifierConfig,
    layout: BuildLayout,
    resolver: R,
    writer: OutputWriter,
}

impl<R: DependencyResolver> MergeOrchestrator<R> {
    /// Fails with a configuration error if the exclude list is malformed.
    pub fn new(settings: MergeSettings, layout: BuildLayout, resolver: R) -> Result<Self, MergeError> {
        let classifier = settings.classifier_config()?;
        let writer = OutputWriter::new(&layout.classes_dir);
        Ok(Self {
            settings,
            classifier,
            layout,
            resolver,
            writer,
        })
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Final location of the merged jar
    pub fn merged_jar_path(&self) -> PathBuf {
        self.layout
            .output_dir
            .join(self.settings.merged_jar_file_name())
    }

    /// Run a merge with fresh state.
    pub fn run(&self) -> Result<MergeReport, MergeError> {
        let mut run = MergeRun::new();
        self.run_with(&mut run)
    }

    /// Run a merge into `run`, leaving it in DONE or FAILED.
    pub fn run_with(&self, run: &mut MergeRun) -> Result<MergeReport, MergeError> {
        match self.execute(run) {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(phase = ?run.phase(), "Merge failed: {}", e);
                run.fail();
                Err(e)
            }
        }
    }

    fn execute(&self, run: &mut MergeRun) -> Result<MergeReport, MergeError> {
        let merged_jar = self.validate()?;
        let primary = &self.layout.primary_artifact;

        run.transition(MergePhase::ResolvingInputs)?;
        let dependencies = participating_archives(self.resolver.resolve()?);
        info!(count = dependencies.len(), "Resolved dependency archives");

        run.transition(MergePhase::ProcessingPrimary)?;
        if let Some(target) = &merged_jar {
            let manifest = self.merged_manifest(primary)?;
            run.archive = Some(MergedArchive::create(target, &manifest)?);
        }

        let walker = ArchiveWalker::new(&self.classifier);
        let mut archives = Vec::with_capacity(dependencies.len() + 1);
        let primary_id = archive_id(primary);
        let stats = walker.walk(primary, &primary_id, run, true)?;
        archives.push(ArchiveSummary {
            id: primary_id,
            path: primary.clone(),
            primary: true,
            stats,
        });

        run.transition(MergePhase::ProcessingDependencies)?;
        for path in dependencies {
            let id = archive_id(&path);
            let stats = walker.walk(&path, &id, run, false)?;
            archives.push(ArchiveSummary {
                id,
                path,
                primary: false,
                stats,
            });
        }

        run.transition(MergePhase::Flushing)?;
        let merged_resources = self.writer.flush(run)?;
        let (merged_archive, merged_archive_sha256) = match run.archive.take() {
            Some(archive) => {
                let path = archive.commit()?;
                let digest = sha256_file(&path)?;
                info!(path = %path.display(), sha256 = %digest, "Wrote merged jar");
                (Some(path), Some(digest))
            }
            None => (None, None),
        };

        run.transition(MergePhase::Done)?;
        info!(
            merged_resources = merged_resources.len(),
            archives = archives.len(),
            warnings = run.diagnostics.len(),
            "Merge complete"
        );

        Ok(MergeReport {
            phase: run.phase(),
            primary: primary.clone(),
            merged_archive,
            merged_archive_sha256,
            passthrough_entries: archives.iter().map(|a| a.stats.copied).sum(),
            archives,
            merged_resources,
            diagnostics: std::mem::take(&mut run.diagnostics).into_vec(),
        })
    }

    /// INIT checks. Returns the merged jar path when one will be written.
    fn validate(&self) -> Result<Option<PathBuf>, MergeError> {
        let primary = &self.layout.primary_artifact;
        if !primary.is_file() {
            return Err(ConfigError::PrimaryArtifact(primary.display().to_string()).into());
        }

        for dir in [&self.layout.classes_dir, &self.layout.output_dir] {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::OutputLocation {
                    path: dir.display().to_string(),
                    message: "exists and is not a directory".to_string(),
                }
                .into());
            }
        }

        if !self.settings.merged_archive {
            return Ok(None);
        }

        let target = self.merged_jar_path();
        if same_file(&target, primary) {
            return Err(ConfigError::OutputIsPrimary(target.display().to_string()).into());
        }
        fs::create_dir_all(&self.layout.output_dir).map_err(|e| ConfigError::OutputLocation {
            path: self.layout.output_dir.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(target))
    }

    /// Manifest for the merged jar: the primary's own, with the main class set
    fn merged_manifest(&self, primary: &Path) -> Result<JarManifest, MergeError> {
        let mut manifest = read_manifest(primary, &archive_id(primary))?.unwrap_or_default();
        if let Some(main_class) = &self.settings.main_class {
            manifest.set_main_attribute(MAIN_CLASS_ATTRIBUTE, main_class);
        }
        Ok(manifest)
    }
}

/// Archive identifier used in origins, diagnostics and the properties comment
pub fn archive_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => {
            let parent_a = a.parent().and_then(|p| fs::canonicalize(p).ok());
            let parent_b = b.parent().and_then(|p| fs::canonicalize(p).ok());
            parent_a.is_some() && parent_a == parent_b && a.file_name() == b.file_name()
        }
    }
}

fn sha256_file(path: &Path) -> Result<String, MergeError> {
    let bytes = fs::read(path).map_err(|e| MergeError::OutputRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
