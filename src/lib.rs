//! classpath-merge - deterministic resource merging for fat jars
//!
//! Walks a primary artifact and its dependency jars, merges settings
//! properties and line-list resources that several archives ship under the
//! same name, and copies everything else into a merged jar once.

pub mod archive;
pub mod config;
pub mod error;
pub mod lineset;
pub mod output;
pub mod properties;
pub mod resolve;
pub mod run;
pub mod telemetry;
pub mod tracker;

pub use classpath_classifier::{
    classify, explain, Classification, ClassifierConfig, MatchedRule, MergeStrategy, ResourcePath,
};
pub use config::{ConfigError, EffectiveConfig, MergeSettings};
pub use error::MergeError;
pub use resolve::{
    ChainResolver, Dependency, DependencyResolver, ListFileResolver, Scope, StaticResolver,
};
pub use run::{BuildLayout, Diagnostic, MergeOrchestrator, MergePhase, MergeReport, MergeRun};
