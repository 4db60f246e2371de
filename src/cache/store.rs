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
use crate::cache::storage::{load_entries, save_entries};
use crate::error::{ImageToolError, Result};
use crate::locking::LockController;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const METADATA_FILE_NAME: &str = ".metadata";
pub const LOCK_FILE_NAME: &str = ".metadata.lock";

/// [`CacheStore`] backed by the `.metadata` file in the cache directory.
///
/// Writers hold an exclusive lock on `.metadata.lock`, reload the file, apply
/// their change and rewrite it atomically, so concurrent invocations never
/// drop each other's entries.
#[derive(Debug)]
pub struct FileCacheStore {
    cache_dir: PathBuf,
    metadata_path: PathBuf,
    entries: BTreeMap<String, String>,
    lock: LockController,
}

impl FileCacheStore {
    pub fn open(cache_dir: &Path, lock_timeout: Duration) -> Result<Self> {
        fs::create_dir_all(cache_dir).map_err(|e| {
            ImageToolError::CacheStoreIo(format!(
                "Failed to create cache directory {}: {e}",
                cache_dir.display()
            ))
        })?;

        let metadata_path = cache_dir.join(METADATA_FILE_NAME);
        let entries = load_entries(&metadata_path)?;
        debug!(
            "Loaded {} cache entries from {}",
            entries.len(),
            metadata_path.display()
        );

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
            metadata_path,
            entries,
            lock: LockController::new(cache_dir.join(LOCK_FILE_NAME), lock_timeout),
        })
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    fn mutate<T>(&mut self, apply: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        let handle = self.lock.acquire()?;

        let mut entries = load_entries(&self.metadata_path)?;
        let outcome = apply(&mut entries);
        save_entries(&entries, &self.metadata_path)?;
        self.entries = entries;

        handle.release()?;
        Ok(outcome)
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<PathBuf> {
        self.entries.get(&key.to_lowercase()).map(PathBuf::from)
    }

    fn add(&mut self, key: &str, path: &Path) -> Result<()> {
        let key = key.to_lowercase();
        let value = path.to_string_lossy().into_owned();
        info!("Adding cache entry {key}={value}");
        self.mutate(|entries| {
            entries.insert(key, value);
        })
    }

    fn delete(&mut self, key: &str) -> Result<Option<PathBuf>> {
        let key = key.to_lowercase();
        let removed = self.mutate(|entries| entries.remove(&key))?;
        if removed.is_some() {
            info!("Deleted cache entry {key}");
        }
        Ok(removed.map(PathBuf::from))
    }

    fn list(&self) -> BTreeMap<String, PathBuf> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), PathBuf::from(value)))
            .collect()
    }

    fn clear(&mut self) -> Result<()> {
        info!("Clearing cache entries in {}", self.metadata_path.display());
        self.mutate(BTreeMap::clear)
    }

    fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
