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

//! Local artifact cache: the flat key to path store and the richer artifact
//! registry kept next to it.

mod key;
mod registry;
mod storage;
mod store;


pub use key::{CacheKey, KEY_SEPARATOR, canonical_key, resolve, resolve_with_host};
pub use registry::{
    ArtifactRecord, ArtifactRegistry, GenericInstallerPolicy, InstallerMetaData, PatchMetaData,
    REGISTRY_FILE_NAME, native_installers_policy,
};
pub use store::{FileCacheStore, LOCK_FILE_NAME, METADATA_FILE_NAME};

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Case-insensitive mapping from cache keys to artifact paths.
///
/// Implementations lower-case keys on every read and write, and persist each
/// mutation before returning.
pub trait CacheStore {
    fn get(&self, key: &str) -> Option<PathBuf>;

    fn add(&mut self, key: &str, path: &Path) -> Result<()>;

    /// Remove `key`, returning the path it pointed at.
    fn delete(&mut self, key: &str) -> Result<Option<PathBuf>>;

    fn list(&self) -> BTreeMap<String, PathBuf>;

    fn clear(&mut self) -> Result<()>;

    /// Directory where downloaded artifacts are placed.
    fn cache_dir(&self) -> &Path;
}
