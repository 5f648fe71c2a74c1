//! Non-fatal merge diagnostics.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Something worth a warning that does not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diagnostic {
    /// A later archive changed the value of a properties key.
    KeyConflict {
        path: String,
        key: String,
        old_value: String,
        new_value: String,
        archive: String,
    },

    /// A merged value replaced a different value already on disk.
    LocalOverride {
        path: String,
        key: String,
        local_value: String,
        merged_value: String,
        location: String,
    },

    /// A passthrough entry showed up again; the first copy was kept.
    DuplicateEntryClobber {
        path: String,
        kept_from: String,
        archive: String,
    },

    /// Two merged resources share a file name in the settings directory.
    SettingsNameCollision {
        file_name: String,
        previous: String,
        path: String,
    },
}

impl Diagnostic {
    /// Human-readable one-line description
    pub fn message(&self) -> String {
        match self {
            Diagnostic::KeyConflict {
                path,
                key,
                old_value,
                new_value,
                archive,
            } => format!(
                "{}={} in {}!{} overrides {}={}",
                key, new_value, archive, path, key, old_value
            ),
            Diagnostic::LocalOverride {
                path,
                key,
                local_value,
                merged_value,
                location,
            } => format!(
                "Merged {}={} overrides {}={} in {} ({})",
                key, merged_value, key, local_value, location, path
            ),
            Diagnostic::DuplicateEntryClobber {
                path,
                kept_from,
                archive,
            } => format!(
                "Saw more than one {} (kept {}, ignored {}). One will clobber the other.",
                path, kept_from, archive
            ),
            Diagnostic::SettingsNameCollision {
                file_name,
                previous,
                path,
            } => format!(
                "Settings copy {} from {} replaces the one from {}",
                file_name, path, previous
            ),
        }
    }
}

/// Collected diagnostics of one run; every push is also logged
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic.message());
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
