//! Jar input and output
//!
//! - `walker`: reads source jars entry by entry
//! - `sink`: the merged jar being written
//! - `manifest`: `META-INF/MANIFEST.MF` handling

mod manifest;
mod sink;
mod walker;

pub use manifest::{JarManifest, MANIFEST_PATH};
pub use sink::{MergedArchive, ARCHIVE_COMMENT};
pub use walker::{read_manifest, ArchiveWalker, WalkStats};
