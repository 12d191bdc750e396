//! Simulator enumeration for rch-scan
//!
//! Lists the simulated devices installed on the host by reading
//! `xcrun simctl list devices -j`, and exposes them as [`Device`] records
//! per [`SimPlatform`]. Consumers depend on the [`DeviceSource`] trait so
//! that device selection can be exercised without Xcode installed.

mod device;
mod list;

pub use device::{Device, SimPlatform};
pub use list::{parse_device_list, parse_runtime_key, DeviceSource, Simctl, StaticDevices};

use std::io;
use thiserror::Error;

/// Errors from simulator enumeration
#[derive(Debug, Error)]
pub enum SimctlError {
    #[error("simctl command failed: {0}")]
    SimctlFailed(String),

    #[error("failed to parse simctl output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown simulator platform: {0}")]
    UnknownPlatform(String),
}

/// Result type for simctl operations
pub type SimctlResult<T> = Result<T, SimctlError>;
