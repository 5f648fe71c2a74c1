//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default values for every merge option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Comma-separated exclude prefixes (default: none)
    pub exclude: String,

    /// Skip `META-INF/maven*` entries (default: true)
    pub skip_vendor_metadata: bool,

    /// Merge `META-INF/settings/*.properties` (default: true)
    pub normalize_settings_files: bool,

    /// Skip license-like files under `META-INF` (default: false)
    pub skip_license_files: bool,

    /// Produce the merged jar (default: true)
    pub merged_archive: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            exclude: String::new(),
            skip_vendor_metadata: true,
            normalize_settings_files: true,
            skip_license_files: false,
            merged_archive: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a TOML table for layering
    pub fn to_table(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("exclude".to_string(), toml::Value::String(self.exclude.clone()));
        table.insert(
            "skip_vendor_metadata".to_string(),
            toml::Value::Boolean(self.skip_vendor_metadata),
        );
        table.insert(
            "normalize_settings_files".to_string(),
            toml::Value::Boolean(self.normalize_settings_files),
        );
        table.insert(
            "skip_license_files".to_string(),
            toml::Value::Boolean(self.skip_license_files),
        );
        table.insert(
            "merged_archive".to_string(),
            toml::Value::Boolean(self.merged_archive),
        );
        table
    }
}
