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

use crate::error::ImageToolError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a ImageToolError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a ImageToolError) -> Self {
        let (suggestion, details) = match error {
            ImageToolError::NotFound { key, alternate } => {
                let suggestion = Some(format!(
                    "Download the file and register it with 'imagetool cache add-entry --key {key} \
                     --value <path>', or use 'cache add-installer' / 'cache add-patch'."
                ));
                let details = alternate
                    .as_ref()
                    .map(|alt| format!("Looked up '{key}' and then '{alt}'"));
                (suggestion, details)
            }
            ImageToolError::InvalidCredentials(msg) => {
                let suggestion = Some(
                    "Verify the Oracle Support user and password, or run offline with --offline to \
                     skip the patch catalog."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            ImageToolError::InvalidPatchIdFormat(id) => {
                let suggestion = Some(
                    "Patch IDs are bug numbers of at least 8 digits, optionally followed by a \
                     version: '12345678' or '12345678_12.2.1.4.0'."
                        .to_string(),
                );
                let details = Some(format!("Rejected patch ID: {id}"));
                (suggestion, details)
            }
            ImageToolError::InvalidVersionFormat(msg) => {
                let suggestion = Some(
                    "Versions are dot-separated numbers with an optional qualifier, e.g. \
                     '12.2.1.4.0' or '14.1.2.0.0-SNAPSHOT'."
                        .to_string(),
                );
                let details = Some(format!("Invalid format: {msg}"));
                (suggestion, details)
            }
            ImageToolError::CatalogUnavailable(msg) => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings, or raise \
                     WLSIMG_ARU__RETRY_MAX to retry more often."
                        .to_string(),
                );
                let details = Some(format!("Catalog issue: {msg}"));
                (suggestion, details)
            }
            ImageToolError::CacheStoreIo(msg) => {
                let suggestion = Some(
                    "Ensure the cache directory exists and is writable, or point WLSIMG_CACHE_DIR \
                     at another location."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            ImageToolError::PatchVersionNotFound {
                bug_number,
                available,
                ..
            } => {
                let suggestion = if available.is_empty() {
                    Some(format!("Patch {bug_number} has no downloadable versions."))
                } else {
                    Some(format!(
                        "Available versions of {bug_number}:\n{}",
                        available
                            .iter()
                            .map(|v| format!("  - {bug_number}_{v}"))
                            .collect::<Vec<_>>()
                            .join("\n")
                    ))
                };
                (suggestion, None)
            }
            ImageToolError::MultiplePatchVersions {
                bug_number,
                versions,
            } => {
                let suggestion = Some(format!(
                    "Specify the version explicitly, one of:\n{}",
                    versions
                        .iter()
                        .map(|v| format!("  - {bug_number}_{v}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                ));
                (suggestion, None)
            }
            ImageToolError::ChecksumMismatch {
                expected, actual, ..
            } => {
                let suggestion = Some(
                    "Delete the partial download and try again. If the problem persists, the file \
                     may be corrupted at the source."
                        .to_string(),
                );
                let details = Some(format!("Expected {expected}, got {actual}"));
                (suggestion, details)
            }
            ImageToolError::LockingTimeout { path, .. } => {
                let suggestion = Some(
                    "Another imagetool process may be updating the cache. Wait for it to finish \
                     or raise WLSIMG_LOCKING__TIMEOUT_SECS."
                        .to_string(),
                );
                let details = Some(format!("Lock file: {path}"));
                (suggestion, details)
            }
            ImageToolError::Http(http_err) => {
                let error_string = http_err.to_string();
                let suggestion = if error_string.contains("timeout")
                    || error_string.contains("Timeout")
                {
                    Some("Try increasing WLSIMG_ARU__TIMEOUT_SECS.".to_string())
                } else {
                    Some("Check your internet connection and try again.".to_string())
                };
                let details = Some(format!("HTTP error: {http_err}"));
                (suggestion, details)
            }
            ImageToolError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check file permissions on the cache directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
