// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageToolError {
    #[error("No cached file found for key '{key}'")]
    NotFound {
        key: String,
        alternate: Option<String>,
    },

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid patch ID format: {0}")]
    InvalidPatchIdFormat(String),

    #[error("Patch catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Cache store I/O error: {0}")]
    CacheStoreIo(String),

    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Version {version} of patch {bug_number} is not available")]
    PatchVersionNotFound {
        bug_number: String,
        version: String,
        available: Vec<String>,
    },

    #[error("Patch {bug_number} is available in multiple versions")]
    MultiplePatchVersions {
        bug_number: String,
        versions: Vec<String>,
    },

    #[error("Unknown installer type: {0}")]
    UnknownInstallerType(String),

    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("Failed to download patch: {0}")]
    Download(String),

    #[error("Checksum verification failed for {path}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Timed out after {waited_secs:.1}s waiting for lock on {path}")]
    LockingTimeout { path: String, waited_secs: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] attohttpc::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImageToolError>;
