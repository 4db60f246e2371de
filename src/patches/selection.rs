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

use crate::aru::{AruPatch, Credentials, PatchCatalog};
use crate::error::{ImageToolError, Result};
use crate::installer::FmwInstallerType;
use crate::models::Architecture;
use crate::patches::PatchId;
use log::{debug, info};
use std::collections::HashSet;

/// Descriptions of patches that are never applied automatically.
pub const EXCLUDED_DESCRIPTIONS: &[&str] = &["ADR FOR WEBLOGIC SERVER"];

/// Inputs of one patch selection pass.
#[derive(Debug, Clone)]
pub struct PatchSelection<'a> {
    pub explicit_ids: &'a [String],
    pub recommended: bool,
    pub latest_psu: bool,
    pub bundle: FmwInstallerType,
    pub version: &'a str,
    /// `None` keeps the catalog out of the selection entirely.
    pub credentials: Option<&'a Credentials>,
    /// Catalog entries built for another platform are dropped when set.
    pub architecture: Option<Architecture>,
}

/// Decide which patches go into the image.
///
/// Explicit ids are validated before the catalog is contacted. Catalog
/// selections come first, explicit ids follow, and the first candidate for
/// each bug number wins.
pub fn select_patches(
    catalog: &dyn PatchCatalog,
    selection: &PatchSelection<'_>,
) -> Result<Vec<AruPatch>> {
    let explicit = PatchId::parse_all(selection.explicit_ids)?;

    if !selection.recommended && !selection.latest_psu && explicit.is_empty() {
        debug!("No patches requested");
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    if selection.recommended || selection.latest_psu {
        let Some(credentials) = selection.credentials else {
            return Err(ImageToolError::InvalidConfig(
                "Recommended patches and the latest PSU need catalog access".to_string(),
            ));
        };

        if selection.recommended {
            candidates =
                catalog.recommended_patches(selection.bundle, selection.version, credentials)?;
        } else if let Some(psu) =
            catalog.latest_psu(selection.bundle, selection.version, credentials)?
        {
            candidates.push(psu);
        }
        candidates = exclude_patches(for_architecture(candidates, selection.architecture));
    }

    if !explicit.is_empty() {
        let psu_version = candidates
            .iter()
            .find_map(|patch| patch.psu_version())
            .map(str::to_string);
        let found = for_architecture(
            catalog.patches_for_bug_numbers(&explicit, selection.credentials)?,
            selection.architecture,
        );

        for id in &explicit {
            candidates.push(choose_version(
                id,
                &found,
                psu_version.as_deref(),
                selection.version,
            )?);
        }
    }

    let selected = dedupe_by_bug_number(candidates);
    info!("Selected {} patches", selected.len());
    Ok(selected)
}

/// Drop patches whose description matches [`EXCLUDED_DESCRIPTIONS`].
pub fn exclude_patches(patches: Vec<AruPatch>) -> Vec<AruPatch> {
    patches
        .into_iter()
        .filter(|patch| {
            let description = patch.description.as_deref().unwrap_or_default().to_uppercase();
            let excluded = EXCLUDED_DESCRIPTIONS
                .iter()
                .any(|pattern| description.contains(pattern));
            if excluded {
                info!(
                    "Skipping patch {}: {}",
                    patch.bug_number,
                    patch.description.as_deref().unwrap_or_default()
                );
            }
            !excluded
        })
        .collect()
}

fn for_architecture(
    patches: Vec<AruPatch>,
    architecture: Option<Architecture>,
) -> Vec<AruPatch> {
    let Some(architecture) = architecture else {
        return patches;
    };
    patches
        .into_iter()
        .filter(|patch| {
            let applies = patch.applies_to(architecture);
            if !applies {
                debug!(
                    "Skipping patch {} built for platform {}",
                    patch.bug_number,
                    patch.platform_id.as_deref().unwrap_or_default()
                );
            }
            applies
        })
        .collect()
}

/// Keep the first candidate for each bug number, preserving order.
pub fn dedupe_by_bug_number(patches: Vec<AruPatch>) -> Vec<AruPatch> {
    let mut seen = HashSet::new();
    patches
        .into_iter()
        .filter(|patch| {
            let first = seen.insert(patch.bug_number.clone());
            if !first {
                debug!("Dropping duplicate patch {}", patch.bug_number);
            }
            first
        })
        .collect()
}

/// Pick the catalog entry for `id`: the requested version, the only version,
/// the version matching the PSU, or the installer version, in that order.
fn choose_version(
    id: &PatchId,
    found: &[AruPatch],
    psu_version: Option<&str>,
    installer_version: &str,
) -> Result<AruPatch> {
    let matching: Vec<&AruPatch> = found
        .iter()
        .filter(|patch| patch.bug_number == id.bug_number())
        .collect();

    // Placeholders stand in for patches when the catalog was skipped.
    if let [only] = matching.as_slice()
        && only.is_placeholder()
    {
        return Ok((*only).clone());
    }

    // First candidate per version, in catalog order.
    let mut by_version: Vec<(&str, &AruPatch)> = Vec::new();
    for patch in &matching {
        if let Some(version) = patch.version.as_deref()
            && !by_version.iter().any(|(seen, _)| *seen == version)
        {
            by_version.push((version, *patch));
        }
    }

    let find = |wanted: &str| {
        by_version
            .iter()
            .find(|(version, _)| *version == wanted)
            .map(|(_, patch)| (*patch).clone())
    };
    let available = || {
        by_version
            .iter()
            .map(|(version, _)| version.to_string())
            .collect::<Vec<_>>()
    };

    if let Some(requested) = id.version() {
        return find(requested).ok_or_else(|| ImageToolError::PatchVersionNotFound {
            bug_number: id.bug_number().to_string(),
            version: requested.to_string(),
            available: available(),
        });
    }

    match by_version.as_slice() {
        [] => Err(ImageToolError::PatchVersionNotFound {
            bug_number: id.bug_number().to_string(),
            version: installer_version.to_string(),
            available: Vec::new(),
        }),
        [(_, patch)] => Ok((*patch).clone()),
        _ => psu_version
            .and_then(|version| find(version))
            .or_else(|| find(installer_version))
            .ok_or_else(|| ImageToolError::MultiplePatchVersions {
                bug_number: id.bug_number().to_string(),
                versions: available(),
            }),
    }
}
