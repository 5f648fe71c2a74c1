//! Merge-strategy classifier for classpath resource paths.
//!
//! Decides, for every entry name found in a jar, whether it is merged as a
//! properties file, merged as a set of lines, skipped, or copied once. The
//! classifier is a pure function of the path and a [`ClassifierConfig`].

mod config;
mod parser;
mod path;
mod patterns;
mod result;

pub use config::ClassifierConfig;
pub use parser::{parse_exclude_list, ExcludeParseError};
pub use path::{ResourcePath, ResourcePathError};
pub use result::{Classification, MatchedRule, MergeStrategy};

use patterns::{matchers, BOOKKEEPING_ENTRIES, VENDOR_METADATA_PREFIX, WELL_KNOWN_LIST_FILES};

/// Classify a resource path into a merge strategy.
pub fn classify(path: &ResourcePath, config: &ClassifierConfig) -> MergeStrategy {
    explain(path, config).strategy
}

/// Classify a resource path and report which rule decided it.
///
/// Rules are evaluated in precedence order and the first match wins:
/// exclude prefixes, archive bookkeeping, vendor metadata, license files,
/// line lists, settings properties, signature files, then passthrough.
pub fn explain(path: &ResourcePath, config: &ClassifierConfig) -> Classification {
    let name = path.as_str();

    if let Some(prefix) = config.matching_exclude(name) {
        return Classification::skip(MatchedRule::ExcludedPrefix(prefix.to_string()));
    }

    if BOOKKEEPING_ENTRIES.contains(&name) {
        return Classification::skip(MatchedRule::ArchiveBookkeeping);
    }

    if config.skip_vendor_metadata && name.starts_with(VENDOR_METADATA_PREFIX) {
        return Classification::skip(MatchedRule::VendorMetadata);
    }

    if config.skip_license_files
        && name.starts_with("META-INF")
        && name.to_lowercase().contains("license")
    {
        return Classification::skip(MatchedRule::LicenseFile);
    }

    if is_line_list(name) {
        return Classification::new(MergeStrategy::LineSetUnion, MatchedRule::LineList);
    }

    if config.normalize_settings_files && matchers().settings_properties.is_match(name) {
        return Classification::new(
            MergeStrategy::PropertiesMerge,
            MatchedRule::SettingsProperties,
        );
    }

    if is_signature_file(path) {
        return Classification::skip(MatchedRule::SignatureFile);
    }

    Classification::new(MergeStrategy::PassthroughOnce, MatchedRule::Default)
}

/// True for jar signature files (`META-INF/*.SF`, `*.DSA`, `*.RSA`).
pub fn is_signature_file(path: &ResourcePath) -> bool {
    matchers().signature.is_match(path.as_str())
}

fn is_line_list(name: &str) -> bool {
    let m = matchers();
    WELL_KNOWN_LIST_FILES.contains(&name)
        || (m.services.is_match(name) && !is_dot_segment(name))
        || m.registrations.is_match(name)
}

/// Last segment is `.` or `..`, which never names a real file.
fn is_dot_segment(name: &str) -> bool {
    matches!(name.rsplit('/').next(), Some(".") | Some(".."))
}
