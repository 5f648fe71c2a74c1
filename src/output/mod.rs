//! Output writer
//!
//! Flushes the accumulated resources of a run to three places: the loose
//! class-output directory, the merged jar and the shared settings directory
//! next to the class-output directory. Properties are written before
//! line-sets, each in ascending path order.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use classpath_classifier::ResourcePath;
use tracing::{debug, info, warn};

use crate::archive::MergedArchive;
use crate::error::MergeError;
use crate::properties::{parse_properties, properties_bytes, PropertyMap};
use crate::run::{Diagnostic, Diagnostics, MergeRun, MergedResource, ResourceKind};

/// Name of the shared settings directory, a sibling of the class-output directory
pub const SETTINGS_DIR_NAME: &str = "settings";

const COMMENT_PREFIX: &str = "Merged by classpath-merge from ";

/// Writes merged resources for one run
#[derive(Debug, Clone)]
pub struct OutputWriter {
    classes_dir: PathBuf,
    settings_dir: PathBuf,
}

/// Sinks shared by every resource of one flush
struct FlushSinks<'a> {
    archive: &'a mut Option<MergedArchive>,
    diagnostics: &'a mut Diagnostics,
    settings_names: HashMap<String, String>,
}

impl OutputWriter {
    pub fn new(classes_dir: impl Into<PathBuf>) -> Self {
        let classes_dir = classes_dir.into();
        let settings_dir = classes_dir
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(SETTINGS_DIR_NAME);
        Self {
            classes_dir,
            settings_dir,
        }
    }

    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Write every accumulated resource of `run`.
    ///
    /// Does nothing at all when the run holds no properties or line-set
    /// resources.
    pub fn flush(&self, run: &mut MergeRun) -> Result<Vec<MergedResource>, MergeError> {
        let mut written = Vec::with_capacity(run.merged_resource_count());
        if run.merged_resource_count() == 0 {
            debug!("No merge-eligible resources; nothing to flush");
            return Ok(written);
        }

        let mut sinks = FlushSinks {
            archive: &mut run.archive,
            diagnostics: &mut run.diagnostics,
            settings_names: HashMap::new(),
        };

        for (path, merged) in run.properties.iter() {
            let origins = run.origins.sorted_origins(path);
            log_combining(path, &origins);
            let loose = self.loose_target(path);

            // An existing loose copy is the lowest-priority layer.
            let map = match &loose {
                Some(target) if target.is_file() => {
                    let on_disk = read_existing_properties(target)?;
                    run.properties.layer_on_disk(
                        path,
                        on_disk,
                        &target.display().to_string(),
                        sinks.diagnostics,
                    )
                }
                _ => merged.clone(),
            };

            let comment = format!("{}{}", COMMENT_PREFIX, origins.join(", "));
            let bytes = properties_bytes(&map, Some(&comment));
            written.push(self.emit(
                path,
                ResourceKind::Properties,
                &bytes,
                map.len(),
                origins,
                loose,
                &mut sinks,
            )?);
        }

        for (path, set) in run.line_sets.iter() {
            let origins = run.origins.sorted_origins(path);
            log_combining(path, &origins);
            let loose = self.loose_target(path);
            let bytes = line_set_bytes(set.lines());
            written.push(self.emit(
                path,
                ResourceKind::LineSet,
                &bytes,
                set.len(),
                origins,
                loose,
                &mut sinks,
            )?);
        }

        info!(
            resources = written.len(),
            settings_dir = %self.settings_dir.display(),
            "Flushed merged resources"
        );
        Ok(written)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        path: &ResourcePath,
        kind: ResourceKind,
        bytes: &[u8],
        entries: usize,
        origins: Vec<String>,
        loose: Option<PathBuf>,
        sinks: &mut FlushSinks<'_>,
    ) -> Result<MergedResource, MergeError> {
        let loose_path = match loose {
            Some(target) if target.is_dir() => {
                warn!(path = %target.display(), "Loose output location is a directory; not writing");
                None
            }
            Some(target) => {
                write_file(&target, bytes, path)?;
                Some(target)
            }
            None => None,
        };

        if let Some(archive) = sinks.archive.as_mut() {
            archive.write_entry(path.as_str(), bytes)?;
        }

        let settings_path = self.settings_target(path);
        if let Some(target) = &settings_path {
            let file_name = path.file_name().to_string();
            if let Some(previous) = sinks
                .settings_names
                .insert(file_name.clone(), path.to_string())
            {
                sinks.diagnostics.push(Diagnostic::SettingsNameCollision {
                    file_name,
                    previous,
                    path: path.to_string(),
                });
            }
            write_file(target, bytes, path)?;
        }

        debug!(entry = %path, entries, "Wrote merged resource");
        Ok(MergedResource {
            path: path.to_string(),
            kind,
            origins,
            loose_path,
            settings_path,
            entries,
        })
    }

    /// Location of the flat copy of `path` in the settings directory.
    ///
    /// `None` when the last segment is empty, `.` or `..`.
    fn settings_target(&self, path: &ResourcePath) -> Option<PathBuf> {
        if !has_usable_file_name(path) {
            warn!(entry = %path, "Resource has no usable file name; not writing settings copy");
            return None;
        }
        Some(self.settings_dir.join(path.file_name()))
    }

    /// Location of `path` under the class-output directory.
    ///
    /// `None` for paths that would land outside it.
    fn loose_target(&self, path: &ResourcePath) -> Option<PathBuf> {
        let relative = Path::new(path.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || !has_usable_file_name(path) {
            warn!(entry = %path, "Resource path leaves the class-output directory; not writing loose copy");
            return None;
        }
        Some(self.classes_dir.join(relative))
    }
}

fn has_usable_file_name(path: &ResourcePath) -> bool {
    !matches!(path.file_name(), "" | "." | "..")
}

fn log_combining(path: &ResourcePath, origins: &[String]) {
    if origins.len() > 1 {
        info!(entry = %path, from = %origins.join(", "), "Combining");
    } else {
        debug!(entry = %path, from = %origins.join(", "), "Writing");
    }
}

/// Lines joined with `\n`, each line terminated
fn line_set_bytes(lines: &[String]) -> Vec<u8> {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.into_bytes()
}

fn read_existing_properties(target: &Path) -> Result<PropertyMap, MergeError> {
    let bytes = fs::read(target).map_err(|e| MergeError::OutputRead {
        path: target.to_path_buf(),
        source: e,
    })?;
    parse_properties(&bytes).map_err(|e| MergeError::OutputRead {
        path: target.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })
}

/// Write-then-rename so readers never see a half-written file
fn write_file(target: &Path, bytes: &[u8], entry: &ResourcePath) -> Result<(), MergeError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| MergeError::write(target, Some(entry.as_str()), e))?;
    }
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = target.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&temp_path, bytes).map_err(|e| MergeError::write(target, Some(entry.as_str()), e))?;
    fs::rename(&temp_path, target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        MergeError::write(target, Some(entry.as_str()), e)
    })
}
