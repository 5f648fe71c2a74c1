//! Normalized archive entry names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors for resource path construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourcePathError {
    #[error("resource path is empty")]
    Empty,
}

/// A forward-slash separated entry name inside an archive.
///
/// Never empty. A trailing `/` marks a directory entry, so `a/b/` and `a/b`
/// are different paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Normalize an entry name: backslashes become `/` and a leading `./` is dropped.
    pub fn new(raw: &str) -> Result<Self, ResourcePathError> {
        let mut normalized = raw.replace('\\', "/");
        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }
        if normalized.is_empty() {
            return Err(ResourcePathError::Empty);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Last path segment (`foo.properties` for `META-INF/settings/foo.properties`).
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(ix) => &trimmed[ix + 1..],
            None => trimmed,
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = ResourcePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ResourcePath::new(&value)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.0
    }
}
