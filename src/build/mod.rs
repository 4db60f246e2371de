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

//! Resolution of every installer and patch file an image build needs.
//!
//! Installers come from the bundle definition (plus an optional JDK) and are
//! looked up in the cache store. Patches are chosen by the selection engine
//! and looked up the same way; catalog patches missing from the cache are
//! downloaded into the cache directory when credentials allow it.

use crate::aru::{AruPatch, Credentials, PatchCatalog};
use crate::cache::{
    ArtifactRegistry, CacheKey, CacheStore, GenericInstallerPolicy, native_installers_policy,
    resolve_with_host,
};
use crate::download::PatchDownloader;
use crate::error::{ImageToolError, Result};
use crate::installer::{FmwInstallerType, InstallerType};
use crate::models::Architecture;
use crate::patches::{PatchId, PatchSelection, select_patches};
use crate::platform::{file_ops, get_current_architecture};
use crate::version::Version;
use log::{debug, info};
use std::path::PathBuf;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Everything the caller decided about one image build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub bundle: FmwInstallerType,
    pub version: String,
    pub architecture: Option<Architecture>,
    pub patch_ids: Vec<String>,
    pub recommended_patches: bool,
    pub latest_psu: bool,
    pub credentials: Option<Credentials>,
    /// Never contact the catalog or download anything.
    pub offline: bool,
    pub jdk_version: Option<String>,
}

impl BuildRequest {
    pub fn new(bundle: FmwInstallerType, version: impl Into<String>) -> Self {
        Self {
            bundle,
            version: version.into(),
            architecture: None,
            patch_ids: Vec::new(),
            recommended_patches: false,
            latest_psu: false,
            credentials: None,
            offline: false,
            jdk_version: None,
        }
    }

    fn catalog_credentials(&self) -> Option<&Credentials> {
        if self.offline {
            None
        } else {
            self.credentials.as_ref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstaller {
    pub installer: InstallerType,
    pub version: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPatch {
    pub bug_number: String,
    pub version: String,
    pub description: Option<String>,
    pub path: PathBuf,
    /// Fetched from the catalog during this resolution.
    pub downloaded: bool,
}

impl ResolvedPatch {
    /// `bug_version`, the form accepted on the command line.
    pub fn patch_id(&self) -> String {
        format!("{}_{}", self.bug_number, self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedBuild {
    pub installers: Vec<ResolvedInstaller>,
    /// In selection order.
    pub patches: Vec<ResolvedPatch>,
}

impl ResolvedBuild {
    pub fn installer_paths(&self) -> Vec<&PathBuf> {
        self.installers.iter().map(|installer| &installer.path).collect()
    }

    pub fn patch_paths(&self) -> Vec<&PathBuf> {
        self.patches.iter().map(|patch| &patch.path).collect()
    }
}

pub struct BuildResolver<'a> {
    store: &'a mut dyn CacheStore,
    catalog: &'a dyn PatchCatalog,
    downloader: &'a dyn PatchDownloader,
    registry: Option<&'a mut ArtifactRegistry>,
    policy: &'a dyn GenericInstallerPolicy,
    host: Architecture,
}

impl<'a> BuildResolver<'a> {
    pub fn new(
        store: &'a mut dyn CacheStore,
        catalog: &'a dyn PatchCatalog,
        downloader: &'a dyn PatchDownloader,
    ) -> Self {
        Self {
            store,
            catalog,
            downloader,
            registry: None,
            policy: &native_installers_policy,
            host: get_current_architecture(),
        }
    }

    /// Consult `registry` for installers the store cannot resolve, and record
    /// downloaded patches in it.
    pub fn with_registry(mut self, registry: &'a mut ArtifactRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_policy(mut self, policy: &'a dyn GenericInstallerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_host(mut self, host: Architecture) -> Self {
        self.host = host;
        self
    }

    pub fn resolve(&mut self, request: &BuildRequest) -> Result<ResolvedBuild> {
        Version::from_str(&request.version)?;
        PatchId::parse_all(&request.patch_ids)?;

        let mut resolved = ResolvedBuild::default();

        for installer in request.bundle.installers_for_version(&request.version)? {
            let path = self.resolve_installer(installer, &request.version, request.architecture)?;
            info!("Using {installer} installer {}", path.display());
            resolved.installers.push(ResolvedInstaller {
                installer,
                version: request.version.clone(),
                path,
            });
        }

        if let Some(jdk_version) = &request.jdk_version {
            let path = self.resolve_installer(InstallerType::Jdk, jdk_version, request.architecture)?;
            info!("Using JDK installer {}", path.display());
            resolved.installers.push(ResolvedInstaller {
                installer: InstallerType::Jdk,
                version: jdk_version.clone(),
                path,
            });
        }

        let selection = PatchSelection {
            explicit_ids: &request.patch_ids,
            recommended: request.recommended_patches,
            latest_psu: request.latest_psu,
            bundle: request.bundle,
            version: &request.version,
            credentials: request.catalog_credentials(),
            architecture: Some(request.architecture.unwrap_or(self.host)),
        };
        for patch in select_patches(self.catalog, &selection)? {
            let resolved_patch = self.resolve_patch(&patch, request)?;
            info!(
                "Using patch {} at {}",
                resolved_patch.patch_id(),
                resolved_patch.path.display()
            );
            resolved.patches.push(resolved_patch);
        }

        Ok(resolved)
    }

    fn resolve_installer(
        &self,
        installer: InstallerType,
        version: &str,
        architecture: Option<Architecture>,
    ) -> Result<PathBuf> {
        let key = CacheKey::new(installer.cache_id(), version).with_architecture(architecture);
        let not_found = match resolve_with_host(&*self.store, &key, self.host) {
            Err(error @ ImageToolError::NotFound { .. }) => error,
            other => return other,
        };

        if let Some(registry) = self.registry.as_deref()
            && let Some(record) = registry.find_installer(
                installer,
                version,
                architecture.unwrap_or(self.host),
                self.policy,
            )
            && file_ops::is_regular_file(&record.location)
        {
            debug!("{key} found in {}", registry.path().display());
            return Ok(record.location.clone());
        }

        Err(not_found)
    }

    fn resolve_patch(&mut self, patch: &AruPatch, request: &BuildRequest) -> Result<ResolvedPatch> {
        let key = patch
            .cache_key(&request.version)
            .with_architecture(request.architecture);
        let version = key.version().to_string();
        let resolved = |path: PathBuf, downloaded: bool| ResolvedPatch {
            bug_number: patch.bug_number.clone(),
            version: version.clone(),
            description: patch.description.clone(),
            path,
            downloaded,
        };

        let not_found = match resolve_with_host(&*self.store, &key, self.host) {
            Ok(path) => return Ok(resolved(path, false)),
            Err(error @ ImageToolError::NotFound { .. }) => error,
            Err(error) => return Err(error),
        };

        if let Some(registry) = self.registry.as_deref()
            && let Some(record) = registry.find_patch(
                &patch.bug_number,
                &version,
                request.architecture.unwrap_or(self.host),
            )
            && file_ops::is_regular_file(&record.location)
        {
            debug!("{key} found in {}", registry.path().display());
            return Ok(resolved(record.location.clone(), false));
        }

        let Some(credentials) = request.catalog_credentials() else {
            return Err(not_found);
        };
        if patch.download_url().is_none() {
            return Err(not_found);
        }

        let path = self
            .downloader
            .download_patch(patch, credentials, self.store.cache_dir())?;

        match self.registry.as_deref_mut() {
            Some(registry) => {
                registry.register_patch(
                    &mut *self.store,
                    &patch.bug_number,
                    &version,
                    patch.architecture(),
                    &path,
                    patch.description.clone(),
                )?;
            }
            None => {
                let stored_key = patch
                    .cache_key(&request.version)
                    .with_architecture(patch.architecture());
                self.store.add(&stored_key.canonical(), &path)?;
            }
        }

        Ok(resolved(std::path::absolute(&path)?, true))
    }
}

/// Resolve `request` with the default generic-installer policy and the
/// current host architecture.
pub fn resolve_build(
    request: &BuildRequest,
    store: &mut dyn CacheStore,
    catalog: &dyn PatchCatalog,
    downloader: &dyn PatchDownloader,
) -> Result<ResolvedBuild> {
    BuildResolver::new(store, catalog, downloader).resolve(request)
}
