//! Layered merge configuration
//!
//! Settings come from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Config file (`classpath-merge.toml`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, ExcludeSpec, MergeSettings,
    DEFAULT_CONFIG_FILE, FALLBACK_JAR_NAME,
};
pub use merge::{merge_tables, overlay_table};
