//! Origin bookkeeping for resource paths.

use std::collections::HashMap;

use classpath_classifier::ResourcePath;

/// Records which archives contributed each resource path, in walk order.
#[derive(Debug, Default)]
pub struct OriginTracker {
    origins: HashMap<ResourcePath, Vec<String>>,
}

impl OriginTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `archive_id` to the origin list of `path`.
    pub fn record_origin(&mut self, path: &ResourcePath, archive_id: &str) {
        self.origins
            .entry(path.clone())
            .or_default()
            .push(archive_id.to_string());
    }

    /// Origins of `path` in the order they were recorded (empty if never seen).
    pub fn origins_of(&self, path: &ResourcePath) -> &[String] {
        self.origins.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct origins of `path`, sorted alphabetically for stable output.
    pub fn sorted_origins(&self, path: &ResourcePath) -> Vec<String> {
        let mut origins = self.origins_of(path).to_vec();
        origins.sort();
        origins.dedup();
        origins
    }

    /// Comma-separated, sorted provenance string (`a.jar, b.jar`).
    pub fn provenance(&self, path: &ResourcePath) -> String {
        self.sorted_origins(path).join(", ")
    }

    /// Number of distinct paths seen.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}
