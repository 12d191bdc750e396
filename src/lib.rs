//! rch-scan - run Xcode unit tests on a simulator
//!
//! This crate picks the simulator to test on, computes the xcodebuild
//! destination for it and assembles the `xcodebuild test` pipeline, with the
//! raw log captured through `tee` and the output rendered by xcpretty.

pub mod command;
pub mod config;
pub mod resolve;
pub mod runner;

pub use command::{CommandError, OutputEnv, RunCache, TestCommandGenerator};
pub use config::{ConfigError, EffectiveConfig, OutputStyle, ScanConfig};
pub use resolve::{compute_destination, resolve_defaults, select_device, ResolveError};
pub use runner::{execute, prepare, prepare_with, PreparedRun, RunError, RunOptions};
