//! Classifier configuration types.

use serde::{Deserialize, Serialize};

/// Options that change how resource paths are classified.
///
/// Built once per merge run and never mutated while archives are walked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path prefixes (already slash-separated) whose entries are skipped.
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,

    /// Skip `META-INF/maven*` build metadata.
    #[serde(default = "default_true")]
    pub skip_vendor_metadata: bool,

    /// Merge `META-INF/settings/*.properties` as key/value maps.
    #[serde(default = "default_true")]
    pub normalize_settings_files: bool,

    /// Skip anything under `META-INF` whose name mentions a license.
    #[serde(default)]
    pub skip_license_files: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            exclude_prefixes: Vec::new(),
            skip_vendor_metadata: true,
            normalize_settings_files: true,
            skip_license_files: false,
        }
    }
}

impl ClassifierConfig {
    /// Return the first configured exclude prefix that `path` starts with.
    pub fn matching_exclude(&self, path: &str) -> Option<&str> {
        self.exclude_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| !prefix.is_empty() && path.starts_with(prefix))
    }
}
