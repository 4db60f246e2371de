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

use crate::cache::{CacheKey, CacheStore};
use crate::download::calculate_sha256;
use crate::error::{ImageToolError, Result};
use crate::installer::InstallerType;
use crate::locking::LockController;
use crate::models::Architecture;
use crate::platform::file_ops;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const REGISTRY_FILE_NAME: &str = "artifacts.json";
const REGISTRY_LOCK_FILE_NAME: &str = "artifacts.json.lock";

/// Metadata describing one cached installer or patch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// `None` for files that work on every architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    pub location: PathBuf,
    pub digest: String,
    pub date_added: NaiveDate,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type InstallerMetaData = ArtifactRecord;
pub type PatchMetaData = ArtifactRecord;

impl ArtifactRecord {
    /// Build a record for an existing file, hashing its contents.
    pub fn from_file(
        location: &Path,
        version: &str,
        architecture: Option<Architecture>,
        description: Option<String>,
    ) -> Result<Self> {
        if !file_ops::is_regular_file(location) {
            return Err(ImageToolError::NotFound {
                key: location.display().to_string(),
                alternate: None,
            });
        }

        Ok(Self {
            architecture,
            location: std::path::absolute(location)?,
            digest: calculate_sha256(location)?,
            date_added: Local::now().date_naive(),
            version: version.to_string(),
            description,
        })
    }

    pub fn architecture_label(&self) -> &'static str {
        self.architecture.map_or("generic", |arch| arch.as_str())
    }
}

/// Decides whether an architecture-less installer may stand in for a
/// specific architecture.
pub trait GenericInstallerPolicy {
    fn allows_generic(&self, installer: InstallerType) -> bool;
}

impl<F> GenericInstallerPolicy for F
where
    F: Fn(InstallerType) -> bool,
{
    fn allows_generic(&self, installer: InstallerType) -> bool {
        self(installer)
    }
}

/// Pure Java installers run anywhere. Installers that ship native binaries
/// must match the requested architecture.
pub fn native_installers_policy(installer: InstallerType) -> bool {
    !installer.is_native()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryData {
    #[serde(default)]
    installers: BTreeMap<String, BTreeMap<String, Vec<ArtifactRecord>>>,
    #[serde(default)]
    patches: BTreeMap<String, Vec<ArtifactRecord>>,
}

/// Installer and patch records persisted as `artifacts.json` in the cache
/// directory.
#[derive(Debug)]
pub struct ArtifactRegistry {
    path: PathBuf,
    data: RegistryData,
    lock: LockController,
}

impl ArtifactRegistry {
    pub fn open(cache_dir: &Path, lock_timeout: Duration) -> Result<Self> {
        let path = cache_dir.join(REGISTRY_FILE_NAME);
        let data = load_registry(&path)?;
        Ok(Self {
            path,
            data,
            lock: LockController::new(cache_dir.join(REGISTRY_LOCK_FILE_NAME), lock_timeout),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All installer records as `(installer type, version, record)`.
    pub fn installers(&self) -> Vec<(&str, &str, &ArtifactRecord)> {
        self.data
            .installers
            .iter()
            .flat_map(|(kind, versions)| {
                versions.iter().flat_map(move |(version, records)| {
                    records
                        .iter()
                        .map(move |record| (kind.as_str(), version.as_str(), record))
                })
            })
            .collect()
    }

    /// All patch records as `(bug number, record)`.
    pub fn patches(&self) -> Vec<(&str, &ArtifactRecord)> {
        self.data
            .patches
            .iter()
            .flat_map(|(bug, records)| records.iter().map(move |record| (bug.as_str(), record)))
            .collect()
    }

    /// Record an installer file and add its key to `store`.
    pub fn register_installer(
        &mut self,
        store: &mut dyn CacheStore,
        installer: InstallerType,
        version: &str,
        architecture: Option<Architecture>,
        location: &Path,
        description: Option<String>,
    ) -> Result<ArtifactRecord> {
        let record = ArtifactRecord::from_file(location, version, architecture, description)?;
        let kind = installer.cache_id().to_string();
        let bucket_version = version.to_string();

        self.mutate(|data| {
            let bucket = data
                .installers
                .entry(kind)
                .or_default()
                .entry(bucket_version)
                .or_default();
            insert_record(bucket, record.clone());
        })?;

        let key = CacheKey::new(installer.cache_id(), version).with_architecture(architecture);
        store.add(&key.canonical(), &record.location)?;
        info!(
            "Registered {installer} {version} ({}) at {}",
            record.architecture_label(),
            record.location.display()
        );
        Ok(record)
    }

    /// Record a patch file and add its `bug_version` key to `store`.
    pub fn register_patch(
        &mut self,
        store: &mut dyn CacheStore,
        bug_number: &str,
        version: &str,
        architecture: Option<Architecture>,
        location: &Path,
        description: Option<String>,
    ) -> Result<ArtifactRecord> {
        let record = ArtifactRecord::from_file(location, version, architecture, description)?;
        let bug = bug_number.to_string();

        self.mutate(|data| {
            insert_record(data.patches.entry(bug).or_default(), record.clone());
        })?;

        let key = CacheKey::new(bug_number, version).with_architecture(architecture);
        store.add(&key.canonical(), &record.location)?;
        info!(
            "Registered patch {bug_number}_{version} ({}) at {}",
            record.architecture_label(),
            record.location.display()
        );
        Ok(record)
    }

    /// Installer record for `architecture`, or the generic record when
    /// `policy` accepts one for this installer type.
    pub fn find_installer(
        &self,
        installer: InstallerType,
        version: &str,
        architecture: Architecture,
        policy: &dyn GenericInstallerPolicy,
    ) -> Option<&ArtifactRecord> {
        let records = self
            .data
            .installers
            .get(installer.cache_id())?
            .get(version)?;

        records
            .iter()
            .find(|record| record.architecture == Some(architecture))
            .or_else(|| {
                if policy.allows_generic(installer) {
                    records.iter().find(|record| record.architecture.is_none())
                } else {
                    None
                }
            })
    }

    /// Patch record for `architecture`, falling back to a generic patch.
    pub fn find_patch(
        &self,
        bug_number: &str,
        version: &str,
        architecture: Architecture,
    ) -> Option<&ArtifactRecord> {
        let records: Vec<&ArtifactRecord> = self
            .data
            .patches
            .get(bug_number)?
            .iter()
            .filter(|record| record.version == version)
            .collect();

        records
            .iter()
            .find(|record| record.architecture == Some(architecture))
            .or_else(|| records.iter().find(|record| record.architecture.is_none()))
            .copied()
    }

    fn mutate(&mut self, apply: impl FnOnce(&mut RegistryData)) -> Result<()> {
        let handle = self.lock.acquire()?;

        let mut data = load_registry(&self.path)?;
        apply(&mut data);
        save_registry(&data, &self.path)?;
        self.data = data;

        handle.release()
    }
}

/// Records are unique by full equality. A record for the same architecture
/// and version replaces the previous one.
fn insert_record(bucket: &mut Vec<ArtifactRecord>, record: ArtifactRecord) {
    if bucket.contains(&record) {
        debug!("Record for {} already present", record.location.display());
        return;
    }
    bucket.retain(|existing| {
        existing.architecture != record.architecture || existing.version != record.version
    });
    bucket.push(record);
}

fn load_registry(path: &Path) -> Result<RegistryData> {
    if !path.exists() {
        return Ok(RegistryData::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ImageToolError::CacheStoreIo(format!(
            "Failed to read artifact registry {}: {e}",
            path.display()
        ))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        ImageToolError::CacheStoreIo(format!(
            "Failed to parse artifact registry {}: {e}",
            path.display()
        ))
    })
}

fn save_registry(data: &RegistryData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    file_ops::write_atomically(path, json.as_bytes()).map_err(|e| {
        ImageToolError::CacheStoreIo(format!(
            "Failed to write artifact registry {}: {e}",
            path.display()
        ))
    })
}
