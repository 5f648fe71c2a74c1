//! The merged jar being written.
//!
//! Entries go to a hidden `.<name>.partial` file next to the final jar. Only
//! [`MergedArchive::commit`] renames it into place; dropping an uncommitted
//! archive (any error path) deletes the partial file so a truncated jar is
//! never left looking valid.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use classpath_classifier::ResourcePath;
use tracing::{debug, warn};
use zip::read::ZipFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::manifest::{JarManifest, MANIFEST_PATH};
use crate::error::{zip_io, MergeError};

/// Comment stored in every merged jar
pub const ARCHIVE_COMMENT: &str = "Merged jar created by classpath-merge";

const COPY_BUFFER_BYTES: usize = 8192;

/// Options for entries generated by the merge (manifest, merged resources).
///
/// The timestamp is pinned to the DOS epoch so content never depends on
/// when the merge ran.
fn generated_options() -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Merged jar output stream
pub struct MergedArchive {
    final_path: PathBuf,
    temp_path: PathBuf,
    writer: Option<ZipWriter<BufWriter<File>>>,
    entries: usize,
    committed: bool,
}

impl MergedArchive {
    /// Start a merged jar at `final_path`, writing `manifest` as the first entry.
    pub fn create(final_path: &Path, manifest: &JarManifest) -> Result<Self, MergeError> {
        let file_name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "merged.jar".to_string());
        let dir = final_path.parent().unwrap_or_else(|| Path::new("."));
        let temp_path = dir.join(format!(".{}.partial", file_name));

        let file = File::create(&temp_path)
            .map_err(|e| MergeError::write(&temp_path, None, e))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        writer.set_comment(ARCHIVE_COMMENT);

        let mut archive = Self {
            final_path: final_path.to_path_buf(),
            temp_path,
            writer: Some(writer),
            entries: 0,
            committed: false,
        };
        archive.write_entry(MANIFEST_PATH, &manifest.to_bytes())?;
        Ok(archive)
    }

    /// Entries written so far, manifest included.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    fn writer(&mut self, entry: &str) -> Result<&mut ZipWriter<BufWriter<File>>, MergeError> {
        let target = self.temp_path.clone();
        self.writer.as_mut().ok_or_else(|| {
            MergeError::write(
                target,
                Some(entry),
                std::io::Error::new(std::io::ErrorKind::Other, "archive already closed"),
            )
        })
    }

    /// Write a generated entry in one piece.
    pub fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), MergeError> {
        let target = self.final_path.clone();
        let writer = self.writer(name)?;
        writer
            .start_file(name, generated_options())
            .map_err(|e| MergeError::write(&target, Some(name), zip_io(e)))?;
        writer
            .write_all(bytes)
            .map_err(|e| MergeError::write(&target, Some(name), e))?;
        self.entries += 1;
        Ok(())
    }

    /// Stream an entry from a source archive, keeping its timestamp and mode.
    pub fn copy_entry(
        &mut self,
        source: &mut ZipFile<'_>,
        path: &ResourcePath,
        archive_id: &str,
    ) -> Result<(), MergeError> {
        let name = path.as_str();
        let method = match source.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let mut options = FileOptions::default()
            .compression_method(method)
            .last_modified_time(source.last_modified())
            .large_file(source.size() >= u64::from(u32::MAX));
        if let Some(mode) = source.unix_mode() {
            options = options.unix_permissions(mode);
        }

        let target = self.final_path.clone();
        let writer = self.writer(name)?;
        if path.is_directory() {
            writer
                .add_directory(name, options)
                .map_err(|e| MergeError::write(&target, Some(name), zip_io(e)))?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|e| MergeError::write(&target, Some(name), zip_io(e)))?;
            let mut buffer = [0u8; COPY_BUFFER_BYTES];
            loop {
                let n = source
                    .read(&mut buffer)
                    .map_err(|e| MergeError::read(archive_id, Some(name), e))?;
                if n == 0 {
                    break;
                }
                writer
                    .write_all(&buffer[..n])
                    .map_err(|e| MergeError::write(&target, Some(name), e))?;
            }
        }
        self.entries += 1;
        debug!(entry = name, archive = archive_id, "Bundled entry");
        Ok(())
    }

    /// Finish the jar and move it to its final path.
    pub fn commit(mut self) -> Result<PathBuf, MergeError> {
        let target = self.final_path.clone();
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| MergeError::write(&target, None, std::io::Error::new(std::io::ErrorKind::Other, "archive already closed")))?;
        let mut buffered = writer
            .finish()
            .map_err(|e| MergeError::write(&target, None, zip_io(e)))?;
        buffered
            .flush()
            .map_err(|e| MergeError::write(&target, None, e))?;
        let file = buffered
            .into_inner()
            .map_err(|e| MergeError::write(&target, None, e.into_error()))?;
        file.sync_all()
            .map_err(|e| MergeError::write(&target, None, e))?;
        drop(file);

        fs::rename(&self.temp_path, &self.final_path)
            .map_err(|e| MergeError::write(&target, None, e))?;
        self.committed = true;
        Ok(target)
    }
}

impl Drop for MergedArchive {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Close the zip stream before unlinking the partial file.
        drop(self.writer.take());
        if self.temp_path.exists() {
            warn!(path = %self.temp_path.display(), "Removing incomplete merged jar");
            if let Err(e) = fs::remove_file(&self.temp_path) {
                warn!(path = %self.temp_path.display(), "Could not remove incomplete merged jar: {}", e);
            }
        }
    }
}
