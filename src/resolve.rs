//! Dependency input
//!
//! Resolving a dependency graph is somebody else's job. This module only
//! defines the seam ([`DependencyResolver`]) through which an ordered list of
//! archives arrives, two simple implementations, and the scope filter that
//! decides which archives take part in a merge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Declared scope of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    Compile,
    Runtime,
    System,
    Test,
    Provided,
    Other(String),
}

impl Scope {
    /// Test-only and provided-only dependencies never take part in a merge.
    pub fn participates(&self) -> bool {
        !matches!(self, Scope::Test | Scope::Provided)
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        match s.as_str() {
            "compile" => Scope::Compile,
            "runtime" => Scope::Runtime,
            "system" => Scope::System,
            "test" => Scope::Test,
            "provided" => Scope::Provided,
            _ => Scope::Other(s),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Compile => f.write_str("compile"),
            Scope::Runtime => f.write_str("runtime"),
            Scope::System => f.write_str("system"),
            Scope::Test => f.write_str("test"),
            Scope::Provided => f.write_str("provided"),
            Scope::Other(s) => f.write_str(s),
        }
    }
}

fn default_scope() -> Scope {
    Scope::Compile
}

/// One resolved dependency artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub path: PathBuf,
    #[serde(default = "default_scope")]
    pub scope: Scope,
}

impl Dependency {
    pub fn new(path: impl Into<PathBuf>, scope: Scope) -> Self {
        Self {
            path: path.into(),
            scope,
        }
    }
}

/// Errors from dependency resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Could not read dependency list {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid dependency list {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Supplies the ordered dependency list for a merge run
pub trait DependencyResolver {
    /// Dependencies in resolution order, before scope filtering
    fn resolve(&self) -> Result<Vec<Dependency>, ResolveError>;
}

/// A fixed, already-resolved list
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    dependencies: Vec<Dependency>,
}

impl StaticResolver {
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self) -> Result<Vec<Dependency>, ResolveError> {
        Ok(self.dependencies.clone())
    }
}

#[derive(Debug, Deserialize)]
struct DependencyListFile {
    #[serde(default, rename = "dependency")]
    dependencies: Vec<Dependency>,
}

/// Reads `[[dependency]]` tables (`path`, `scope`) from a TOML file.
///
/// Relative paths are resolved against the list file's directory.
#[derive(Debug, Clone)]
pub struct ListFileResolver {
    path: PathBuf,
}

impl ListFileResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DependencyResolver for ListFileResolver {
    fn resolve(&self) -> Result<Vec<Dependency>, ResolveError> {
        let display = self.path.to_string_lossy().to_string();
        let contents = fs::read_to_string(&self.path).map_err(|e| ResolveError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let parsed: DependencyListFile =
            toml::from_str(&contents).map_err(|e| ResolveError::Parse {
                path: display,
                message: e.to_string(),
            })?;

        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Ok(parsed
            .dependencies
            .into_iter()
            .map(|mut dep| {
                if dep.path.is_relative() {
                    dep.path = base.join(&dep.path);
                }
                dep
            })
            .collect())
    }
}

/// Chains several resolvers, concatenating their output in order
pub struct ChainResolver {
    resolvers: Vec<Box<dyn DependencyResolver>>,
}

impl ChainResolver {
    pub fn new(resolvers: Vec<Box<dyn DependencyResolver>>) -> Self {
        Self { resolvers }
    }
}

impl DependencyResolver for ChainResolver {
    fn resolve(&self) -> Result<Vec<Dependency>, ResolveError> {
        let mut all = Vec::new();
        for resolver in &self.resolvers {
            all.extend(resolver.resolve()?);
        }
        Ok(all)
    }
}

/// Keep the archives that take part in a merge, in resolution order.
///
/// Drops test/provided scopes and anything that is not a `.jar` file name
/// (pom-only or directory dependencies). Existence is not checked here; a
/// missing archive fails when the walker opens it.
pub fn participating_archives(dependencies: Vec<Dependency>) -> Vec<PathBuf> {
    dependencies
        .into_iter()
        .filter_map(|dep| {
            if !dep.scope.participates() {
                debug!(path = %dep.path.display(), scope = %dep.scope, "Skipping dependency by scope");
                return None;
            }
            let is_jar = dep
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".jar"))
                .unwrap_or(false);
            if !is_jar {
                debug!(path = %dep.path.display(), "Skipping non-jar dependency");
                return None;
            }
            Some(dep.path)
        })
        .collect()
}
