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

use crate::cache::CacheStore;
use crate::error::{ImageToolError, Result};
use crate::models::Architecture;
use crate::platform::{file_ops, get_current_architecture};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

pub const KEY_SEPARATOR: char = '_';

/// Identifies one cached artifact by id, version and optional architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    id: String,
    version: String,
    architecture: Option<Architecture>,
}

impl CacheKey {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            architecture: None,
        }
    }

    pub fn with_architecture(mut self, architecture: Option<Architecture>) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn architecture(&self) -> Option<Architecture> {
        self.architecture
    }

    /// Lower-cased key under which this artifact is stored.
    pub fn canonical(&self) -> String {
        canonical_key(&self.id, &self.version, self.architecture)
    }

    /// The single fallback key tried when [`CacheKey::canonical`] misses.
    ///
    /// An explicit architecture falls back to the generic entry. A key without
    /// architecture falls back to the entry registered for `host`.
    pub fn alternate(&self, host: Architecture) -> Option<String> {
        let alternate = match self.architecture {
            Some(_) => canonical_key(&self.id, &self.version, None),
            None => canonical_key(&self.id, &self.version, Some(host)),
        };

        if alternate == self.canonical() {
            None
        } else {
            Some(alternate)
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// `id` on its own when it already contains the separator, otherwise
/// `id_version[_architecture]`. Always lower case.
pub fn canonical_key(id: &str, version: &str, architecture: Option<Architecture>) -> String {
    if id.contains(KEY_SEPARATOR) {
        return id.to_lowercase();
    }

    let mut key = format!("{id}{KEY_SEPARATOR}{version}");
    if let Some(arch) = architecture {
        key.push(KEY_SEPARATOR);
        key.push_str(arch.as_str());
    }
    key.to_lowercase()
}

/// Resolve `key` against the store using the current host architecture for
/// the fallback lookup.
pub fn resolve(store: &dyn CacheStore, key: &CacheKey) -> Result<PathBuf> {
    resolve_with_host(store, key, get_current_architecture())
}

/// Look up the canonical key, then at most one alternate. Only entries that
/// point at an existing regular file count as hits.
pub fn resolve_with_host(
    store: &dyn CacheStore,
    key: &CacheKey,
    host: Architecture,
) -> Result<PathBuf> {
    let primary = key.canonical();
    if let Some(path) = lookup_existing(store, &primary)? {
        return Ok(path);
    }

    let alternate = key.alternate(host);
    if let Some(alternate_key) = &alternate {
        debug!("Cache miss for {primary}, trying {alternate_key}");
        if let Some(path) = lookup_existing(store, alternate_key)? {
            return Ok(path);
        }
    }

    Err(ImageToolError::NotFound {
        key: primary,
        alternate,
    })
}

fn lookup_existing(store: &dyn CacheStore, key: &str) -> Result<Option<PathBuf>> {
    let Some(path) = store.get(key) else {
        return Ok(None);
    };

    if !file_ops::is_regular_file(&path) {
        debug!(
            "Cache entry {key} points at {} which is not a file",
            path.display()
        );
        return Ok(None);
    }

    Ok(Some(absolute(&path)?))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_forms() {
        assert_eq!(canonical_key("wls", "12.2.1.4.0", None), "wls_12.2.1.4.0");
        assert_eq!(
            canonical_key("WLS", "12.2.1.4.0", Some(Architecture::Arm64)),
            "wls_12.2.1.4.0_arm64"
        );
        assert_eq!(
            canonical_key("jdk", "8u202-B08", Some(Architecture::Amd64)),
            "jdk_8u202-b08_amd64"
        );
    }

    #[test]
    fn test_canonical_key_is_idempotent_for_separated_ids() {
        let id = "28186730_13.9.4.2.10";
        assert_eq!(canonical_key(id, "anything", None), id);
        assert_eq!(canonical_key(id, "", Some(Architecture::Amd64)), id);
        assert_eq!(
            canonical_key(&canonical_key(id, "1.0", None), "2.0", None),
            id
        );
    }

    #[test]
    fn test_alternate_with_architecture_is_generic() {
        let key = CacheKey::new("wls", "14.1.1.0.0").with_architecture(Some(Architecture::Arm64));
        assert_eq!(
            key.alternate(Architecture::Amd64).as_deref(),
            Some("wls_14.1.1.0.0")
        );
    }

    #[test]
    fn test_alternate_without_architecture_uses_host() {
        let key = CacheKey::new("wls", "14.1.1.0.0");
        assert_eq!(
            key.alternate(Architecture::Amd64).as_deref(),
            Some("wls_14.1.1.0.0_amd64")
        );
        assert_eq!(
            key.alternate(Architecture::Arm64).as_deref(),
            Some("wls_14.1.1.0.0_arm64")
        );
    }

    #[test]
    fn test_alternate_skipped_when_identical() {
        let key = CacheKey::new("12345678_12.2.1.4.0", "12.2.1.4.0")
            .with_architecture(Some(Architecture::Amd64));
        assert_eq!(key.alternate(Architecture::Amd64), None);
    }
}
