//! Effective configuration with provenance
//!
//! Captures the merged settings plus the sources that contributed to them.

use classpath_classifier::{parse_exclude_list, ClassifierConfig, ExcludeParseError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::BuiltinDefaults;
use super::merge::merge_tables;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "classpath-merge.toml";

/// Merged jar name used when neither a jar name nor a main class is set
pub const FALLBACK_JAR_NAME: &str = "merged-jar";

/// Value treated as "unset" for string options
const UNSET: &str = "none";

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Exclude list as written in config: a comma-separated string or an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeSpec {
    Joined(String),
    Items(Vec<String>),
}

impl Default for ExcludeSpec {
    fn default() -> Self {
        ExcludeSpec::Joined(String::new())
    }
}

impl ExcludeSpec {
    fn parse(&self) -> Result<Vec<String>, ExcludeParseError> {
        match self {
            ExcludeSpec::Joined(raw) => parse_exclude_list(raw),
            ExcludeSpec::Items(items) => parse_exclude_list(&items.join(",")),
        }
    }
}

/// Options recognized by the merge engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeSettings {
    /// Main class written into the merged jar's manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,

    /// Base name of the merged jar (without `.jar`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_jar_name: Option<String>,

    #[serde(default)]
    pub exclude: ExcludeSpec,

    pub skip_vendor_metadata: bool,
    pub normalize_settings_files: bool,
    pub skip_license_files: bool,
    pub merged_archive: bool,
}

impl MergeSettings {
    /// Name of the merged jar file, including the `.jar` extension.
    ///
    /// Uses `output_jar_name`, else the simple name of `main_class`,
    /// else [`FALLBACK_JAR_NAME`].
    pub fn merged_jar_file_name(&self) -> String {
        let base = match (&self.output_jar_name, &self.main_class) {
            (Some(name), _) => name.clone(),
            (None, Some(main)) => simple_class_name(main).to_string(),
            (None, None) => FALLBACK_JAR_NAME.to_string(),
        };
        format!("{}.jar", base)
    }

    /// Classifier options derived from these settings
    pub fn classifier_config(&self) -> Result<ClassifierConfig, ConfigError> {
        Ok(ClassifierConfig {
            exclude_prefixes: self.exclude.parse()?,
            skip_vendor_metadata: self.skip_vendor_metadata,
            normalize_settings_files: self.normalize_settings_files,
            skip_license_files: self.skip_license_files,
        })
    }
}

fn simple_class_name(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(ix) if ix + 1 < class_name.len() => &class_name[ix + 1..],
        _ => class_name,
    }
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub settings: MergeSettings,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers.
    ///
    /// A missing `config_path` file is only an error when `require_file` is set.
    pub fn build(
        config_path: Option<&Path>,
        require_file: bool,
        cli_overrides: Option<toml::Table>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_table()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = config_path {
            if path.exists() {
                let (table, digest) = Self::load_toml_file(path)?;
                layers.push(table);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            } else if require_file {
                return Err(ConfigError::MissingFile(path.to_string_lossy().to_string()));
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_tables(layers);
        let mut settings: MergeSettings = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;
        Self::validate(&mut settings)?;

        Ok(Self { settings, sources })
    }

    fn load_toml_file(path: &Path) -> Result<(toml::Table, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::Parse(format!("Invalid UTF-8: {}", e)))?;
        let table: toml::Table = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))?;

        Ok((table, digest))
    }

    fn validate(settings: &mut MergeSettings) -> Result<(), ConfigError> {
        for slot in [&mut settings.main_class, &mut settings.output_jar_name] {
            if let Some(value) = slot {
                let trimmed = value.trim();
                if trimmed.is_empty() || trimmed == UNSET {
                    *slot = None;
                } else {
                    *value = trimmed.to_string();
                }
            }
        }

        if let Some(name) = &settings.output_jar_name {
            if name.contains('/') || name.contains('\\') {
                return Err(ConfigError::Invalid(format!(
                    "output_jar_name must be a bare file name, got {:?}",
                    name
                )));
            }
        }

        // Parse once here so a malformed list fails before any I/O.
        settings.exclude.parse()?;
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Config file not found: {0}")]
    MissingFile(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Malformed exclude list: {0}")]
    Exclude(#[from] ExcludeParseError),

    #[error("Primary artifact {0} is missing or unreadable")]
    PrimaryArtifact(String),

    #[error("Merged jar {0} would overwrite the primary artifact")]
    OutputIsPrimary(String),

    #[error("Output location {path} cannot be used: {message}")]
    OutputLocation { path: String, message: String },
}
