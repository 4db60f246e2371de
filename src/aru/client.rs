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

use crate::aru::{
    AruPatch, Credentials, PatchCatalog, ReleaseCatalog, parse_patches, parse_releases,
};
use crate::config::AruConfig;
use crate::error::{ImageToolError, Result};
use crate::installer::{AruProduct, FmwInstallerType};
use crate::patches::PatchId;
use crate::user_agent;
use attohttpc::Session;
use log::{debug, info, trace, warn};
use retry::{OperationResult, delay::Fixed, retry_with_index};
use std::sync::OnceLock;
use std::time::Duration;

const RELEASES_PATH: &str = "/Orion/Services/metadata?table=aru_releases";
const SEARCH_PATH: &str = "/Orion/Services/search";

/// [`PatchCatalog`] backed by the ARU web service.
#[derive(Debug)]
pub struct AruClient {
    session: Session,
    base_url: String,
    retry_max: usize,
    retry_interval: Duration,
    releases: OnceLock<ReleaseCatalog>,
}

impl AruClient {
    pub fn new(config: &AruConfig) -> Self {
        let mut session = Session::new();
        session.header("User-Agent", user_agent::catalog_client());
        session.timeout(config.timeout());
        session.proxy_settings(attohttpc::ProxySettings::from_env());

        Self {
            session,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_max: config.retry_max as usize,
            retry_interval: config.retry_interval(),
            releases: OnceLock::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_recommended(
        &self,
        product: AruProduct,
        release_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<AruPatch>> {
        let path = format!(
            "{SEARCH_PATH}?product={}&release={release_id}&life_cycle=Recommended&patch_type=all",
            product.product_id()
        );
        let patches = parse_patches(&self.fetch(&path, credentials)?)?;
        debug!(
            "Catalog returned {} recommended patches for {product} release {release_id}",
            patches.len()
        );
        Ok(patches)
    }

    /// Recommended patches for every product of `bundle` that has a release
    /// at `version`.
    fn recommended_for_bundle(
        &self,
        bundle: FmwInstallerType,
        version: &str,
        credentials: &Credentials,
    ) -> Result<Vec<AruPatch>> {
        let releases = self.all_releases(credentials)?;
        let mut patches = Vec::new();

        for product in bundle.products() {
            let Some(release_id) = releases.release_id(product, version) else {
                debug!("No {product} release for version {version}, skipping");
                continue;
            };
            patches.extend(self.search_recommended(product, release_id, credentials)?);
        }

        Ok(patches)
    }

    fn fetch(&self, path: &str, credentials: &Credentials) -> Result<String> {
        let url = format!("{}{path}", self.base_url);

        let result = retry_with_index(
            Fixed::from(self.retry_interval).take(self.retry_max),
            |current_try| {
                trace!("GET {url} (attempt {current_try})");
                let response = match self
                    .session
                    .get(&url)
                    .basic_auth(credentials.username(), Some(credentials.password()))
                    .send()
                {
                    Ok(response) => response,
                    Err(e) => {
                        debug!("Catalog request failed: {e}");
                        return OperationResult::Retry(ImageToolError::CatalogUnavailable(
                            format!("Network error contacting {}: {e}", self.base_url),
                        ));
                    }
                };

                let status = response.status();
                match status.as_u16() {
                    401 | 403 => {
                        return OperationResult::Err(ImageToolError::InvalidCredentials(
                            format!(
                                "The catalog rejected the credentials for {}",
                                credentials.username()
                            ),
                        ));
                    }
                    429 | 500..=599 => {
                        debug!("Catalog responded with HTTP {}", status.as_u16());
                        return OperationResult::Retry(ImageToolError::CatalogUnavailable(
                            format!("HTTP {} from {}", status.as_u16(), self.base_url),
                        ));
                    }
                    _ if !status.is_success() => {
                        return OperationResult::Err(ImageToolError::CatalogUnavailable(
                            format!(
                                "HTTP {} from {}: {}",
                                status.as_u16(),
                                self.base_url,
                                status.canonical_reason().unwrap_or("Unknown error")
                            ),
                        ));
                    }
                    _ => {}
                }

                match response.text() {
                    Ok(body) => OperationResult::Ok(body),
                    Err(e) => OperationResult::Retry(ImageToolError::CatalogUnavailable(format!(
                        "Failed to read catalog response: {e}"
                    ))),
                }
            },
        );

        result.map_err(|e| {
            if matches!(e.error, ImageToolError::CatalogUnavailable(_)) {
                warn!("Catalog request to {url} failed after {} attempts", e.tries);
            }
            e.error
        })
    }
}

impl PatchCatalog for AruClient {
    fn all_releases(&self, credentials: &Credentials) -> Result<&ReleaseCatalog> {
        if let Some(releases) = self.releases.get() {
            return Ok(releases);
        }

        let releases = parse_releases(&self.fetch(RELEASES_PATH, credentials)?)?;
        info!("Loaded {} releases from the patch catalog", releases.len());
        Ok(self.releases.get_or_init(|| releases))
    }

    fn recommended_patches(
        &self,
        bundle: FmwInstallerType,
        version: &str,
        credentials: &Credentials,
    ) -> Result<Vec<AruPatch>> {
        let patches = self
            .recommended_for_bundle(bundle, version, credentials)?
            .into_iter()
            .filter(|patch| {
                if patch.is_stack_patch_bundle() {
                    debug!("Skipping stack patch bundle {}", patch.bug_number);
                    return false;
                }
                true
            })
            .collect::<Vec<_>>();

        info!(
            "Found {} recommended patches for {bundle} {version}",
            patches.len()
        );
        Ok(patches)
    }

    fn latest_psu(
        &self,
        bundle: FmwInstallerType,
        version: &str,
        credentials: &Credentials,
    ) -> Result<Option<AruPatch>> {
        let releases = self.all_releases(credentials)?;
        let mut latest = None;

        // First product in bundle order with a PSU wins; release ids only
        // order candidates within one product.
        for product in bundle.products() {
            let Some(release_id) = releases.release_id(product, version) else {
                continue;
            };
            latest = self
                .search_recommended(product, release_id, credentials)?
                .into_iter()
                .filter(AruPatch::is_psu)
                .max_by(|left, right| left.compare_psu(right));
            if latest.is_some() {
                break;
            }
        }

        match &latest {
            Some(psu) => info!(
                "Latest PSU for {bundle} {version} is {} ({})",
                psu.bug_number,
                psu.psu_bundle.as_deref().unwrap_or_default()
            ),
            None => info!("No PSU found for {bundle} {version}"),
        }
        Ok(latest)
    }

    fn patches_for_bug_numbers(
        &self,
        ids: &[PatchId],
        credentials: Option<&Credentials>,
    ) -> Result<Vec<AruPatch>> {
        let Some(credentials) = credentials else {
            return Ok(ids
                .iter()
                .map(|id| AruPatch::placeholder(id.bug_number(), id.version()))
                .collect());
        };

        let mut patches = Vec::new();
        for id in ids {
            let path = format!("{SEARCH_PATH}?bug={}", id.bug_number());
            let found = parse_patches(&self.fetch(&path, credentials)?)?;
            if found.is_empty() {
                warn!("Patch {} was not found in the catalog", id.bug_number());
            }
            patches.extend(found);
        }
        Ok(patches)
    }
}
