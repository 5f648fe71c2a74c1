//! Archive walker
//!
//! Visits every entry of one jar in stored order and hands it to the
//! matching merger, copies it once into the merged jar, or drops it.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use classpath_classifier::{explain, is_signature_file, ClassifierConfig, MergeStrategy, ResourcePath};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zip::read::ZipFile;
use zip::ZipArchive;

use super::manifest::{JarManifest, MANIFEST_PATH};
use crate::error::{zip_io, MergeError};
use crate::lineset::read_lines;
use crate::properties::parse_properties;
use crate::run::{Diagnostic, MergeRun};

const MAX_SIZE_HINT: usize = 1 << 20;

/// Per-archive entry counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    pub entries: usize,
    pub skipped: usize,
    pub properties: usize,
    pub line_sets: usize,
    pub copied: usize,
    pub duplicates: usize,
}

/// Walks archives for one merge run
pub struct ArchiveWalker<'a> {
    config: &'a ClassifierConfig,
}

impl<'a> ArchiveWalker<'a> {
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self { config }
    }

    /// Walk every entry of `archive_path`, feeding `run`.
    ///
    /// Any unreadable entry aborts the walk with an error naming the archive
    /// and entry.
    pub fn walk(
        &self,
        archive_path: &Path,
        archive_id: &str,
        run: &mut MergeRun,
        is_primary: bool,
    ) -> Result<WalkStats, MergeError> {
        let mut archive = open_archive(archive_path, archive_id)?;
        info!(
            archive = archive_id,
            entries = archive.len(),
            primary = is_primary,
            "Merging archive"
        );

        let mut stats = WalkStats::default();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| {
                MergeError::read(archive_id, Some(&format!("entry #{}", index)), zip_io(e))
            })?;
            let path = ResourcePath::new(entry.name()).map_err(|e| {
                MergeError::read(
                    archive_id,
                    Some(&format!("entry #{}", index)),
                    io::Error::new(io::ErrorKind::InvalidData, e),
                )
            })?;
            stats.entries += 1;
            run.origins.record_origin(&path, archive_id);

            let classification = explain(&path, self.config);
            match classification.strategy {
                MergeStrategy::Skip => {
                    debug!(entry = %path, rule = %classification.rule.to_code(), "Omit");
                    stats.skipped += 1;
                }
                MergeStrategy::PropertiesMerge => {
                    debug!(entry = %path, archive = archive_id, "Include properties");
                    let bytes = read_entry(&mut entry, archive_id, &path)?;
                    let map = parse_properties(&bytes).map_err(|e| {
                        MergeError::read(
                            archive_id,
                            Some(path.as_str()),
                            io::Error::new(io::ErrorKind::InvalidData, e),
                        )
                    })?;
                    run.properties
                        .merge_into(&path, map, archive_id, &mut run.diagnostics);
                    stats.properties += 1;
                }
                MergeStrategy::LineSetUnion => {
                    debug!(entry = %path, archive = archive_id, "Include lines");
                    let bytes = read_entry(&mut entry, archive_id, &path)?;
                    let text = String::from_utf8_lossy(&bytes);
                    if matches!(text, Cow::Owned(_)) {
                        debug!(entry = %path, archive = archive_id, "Replaced non UTF-8 bytes in line list");
                    }
                    run.line_sets.merge_into(&path, read_lines(&text));
                    stats.line_sets += 1;
                }
                MergeStrategy::PassthroughOnce => {
                    self.passthrough(&mut entry, &path, archive_id, run, &mut stats)?;
                }
            }
        }
        Ok(stats)
    }

    fn passthrough(
        &self,
        entry: &mut ZipFile<'_>,
        path: &ResourcePath,
        archive_id: &str,
        run: &mut MergeRun,
        stats: &mut WalkStats,
    ) -> Result<(), MergeError> {
        if is_signature_file(path) {
            stats.skipped += 1;
            return Ok(());
        }

        if run.seen.contains(path) {
            stats.duplicates += 1;
            if !path.is_directory() && !path.as_str().starts_with("META-INF") {
                let first_archive = run
                    .origins
                    .origins_of(path)
                    .first()
                    .cloned()
                    .unwrap_or_default();
                run.diagnostics.push(Diagnostic::DuplicateEntryClobber {
                    path: path.to_string(),
                    kept_from: first_archive,
                    archive: archive_id.to_string(),
                });
            }
            return Ok(());
        }

        if let Some(sink) = run.archive.as_mut() {
            sink.copy_entry(entry, path, archive_id)?;
            stats.copied += 1;
        }
        run.seen.insert(path.clone());
        Ok(())
    }
}

fn open_archive(path: &Path, archive_id: &str) -> Result<ZipArchive<BufReader<File>>, MergeError> {
    let file = File::open(path).map_err(|e| MergeError::read(archive_id, None, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| MergeError::read(archive_id, None, zip_io(e)))
}

/// Preallocation for an entry whose header declares `declared` bytes.
///
/// Header sizes are not trusted; larger entries grow while reading.
fn size_hint(declared: u64) -> usize {
    usize::try_from(declared).unwrap_or(MAX_SIZE_HINT).min(MAX_SIZE_HINT)
}

fn read_entry(entry: &mut ZipFile<'_>, archive_id: &str, path: &ResourcePath) -> Result<Vec<u8>, MergeError> {
    let mut bytes = Vec::with_capacity(size_hint(entry.size()));
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| MergeError::read(archive_id, Some(path.as_str()), e))?;
    Ok(bytes)
}

/// Load the manifest of a jar, if it has one.
pub fn read_manifest(archive_path: &Path, archive_id: &str) -> Result<Option<JarManifest>, MergeError> {
    let mut archive = open_archive(archive_path, archive_id)?;
    let result = match archive.by_name(MANIFEST_PATH) {
        Ok(mut entry) => {
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| MergeError::read(archive_id, Some(MANIFEST_PATH), e))?;
            Ok(Some(JarManifest::parse(&bytes)))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(MergeError::read(archive_id, Some(MANIFEST_PATH), zip_io(e))),
    };
    result
}
