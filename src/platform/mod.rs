//! Platform detection utilities for the entire application.
//!
//! This module reports the host architecture used for cache-key fallback and
//! hosts the small set of filesystem helpers the cache store relies on.

pub mod file_ops;

use crate::models::Architecture;

/// Detect the architecture of the machine running the tool.
///
/// Maps Rust's target architecture onto the cache-key naming:
/// - `x86_64` → `amd64`
/// - `aarch64` → `arm64`
///
/// Any other target is reported as `amd64`, the architecture every
/// installer in the catalog ships for.
pub fn get_current_architecture() -> Architecture {
    architecture_from_target(std::env::consts::ARCH)
}

fn architecture_from_target(target: &str) -> Architecture {
    match target {
        "aarch64" => Architecture::Arm64,
        "x86_64" => Architecture::Amd64,
        other => {
            log::debug!("Unrecognized target architecture {other}; assuming amd64");
            Architecture::Amd64
        }
    }
}
