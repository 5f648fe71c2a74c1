//! Classifier result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an archive entry is combined across archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    /// Parse as a properties file and merge keys, last writer wins.
    PropertiesMerge,
    /// Union of non-blank lines in first-seen order.
    LineSetUnion,
    /// Never copied or merged.
    Skip,
    /// Copied verbatim from the first archive that contains it.
    PassthroughOnce,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MergeStrategy::PropertiesMerge => "PROPERTIES_MERGE",
            MergeStrategy::LineSetUnion => "LINE_SET_UNION",
            MergeStrategy::Skip => "SKIP",
            MergeStrategy::PassthroughOnce => "PASSTHROUGH_ONCE",
        };
        f.write_str(s)
    }
}

/// The rule that decided a classification, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchedRule {
    /// Path starts with a configured exclude prefix.
    ExcludedPrefix(String),
    /// Archive bookkeeping entry (manifest, index, `META-INF/` itself).
    ArchiveBookkeeping,
    /// `META-INF/maven*` build metadata.
    VendorMetadata,
    /// License-like file under `META-INF`.
    LicenseFile,
    /// Service registration, `.registrations` file or well-known list file.
    LineList,
    /// `META-INF/settings/*.properties`.
    SettingsProperties,
    /// `.SF`, `.DSA` or `.RSA` signature file directly under `META-INF/`.
    SignatureFile,
    /// No other rule matched.
    Default,
}

impl MatchedRule {
    /// Machine-readable code for this rule.
    pub fn to_code(&self) -> String {
        match self {
            MatchedRule::ExcludedPrefix(p) => format!("EXCLUDED_PREFIX:{}", p),
            MatchedRule::ArchiveBookkeeping => "ARCHIVE_BOOKKEEPING".to_string(),
            MatchedRule::VendorMetadata => "VENDOR_METADATA".to_string(),
            MatchedRule::LicenseFile => "LICENSE_FILE".to_string(),
            MatchedRule::LineList => "LINE_LIST".to_string(),
            MatchedRule::SettingsProperties => "SETTINGS_PROPERTIES".to_string(),
            MatchedRule::SignatureFile => "SIGNATURE_FILE".to_string(),
            MatchedRule::Default => "DEFAULT".to_string(),
        }
    }
}

/// Outcome of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub strategy: MergeStrategy,
    pub rule: MatchedRule,
}

impl Classification {
    pub(crate) fn new(strategy: MergeStrategy, rule: MatchedRule) -> Self {
        Self { strategy, rule }
    }

    pub(crate) fn skip(rule: MatchedRule) -> Self {
        Self::new(MergeStrategy::Skip, rule)
    }
}
