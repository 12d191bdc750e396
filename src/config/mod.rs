//! Configuration layering
//!
//! Options are merged from four layers, last wins:
//! 1. Built-in defaults
//! 2. Repo config (`.rch/scan.toml` next to the project)
//! 3. `SCAN_*` environment variables
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;
mod options;

pub use defaults::BuiltinDefaults;
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, REPO_CONFIG_PATH,
};
pub use merge::{deep_merge, merge_layers};
pub use options::{env_overrides, expand_tilde, OutputStyle, ScanConfig};
