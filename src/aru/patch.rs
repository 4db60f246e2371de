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

use crate::aru::xml::{child, child_text, children, parse_results};
use crate::cache::CacheKey;
use crate::error::Result;
use crate::models::Architecture;
use crate::version::Version;
use log::{debug, trace};
use std::cmp::Ordering;
use std::str::FromStr;

/// Platform id the catalog uses for architecture independent patches.
pub const GENERIC_PLATFORM_ID: &str = "2000";

const STACK_PATCH_BUNDLE: &str = "STACK PATCH BUNDLE";

/// One patch offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AruPatch {
    pub bug_number: String,
    pub release_id: Option<String>,
    /// Release name, which is the product version the patch applies to.
    pub version: Option<String>,
    pub platform_id: Option<String>,
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub download_host: Option<String>,
    pub download_path: Option<String>,
    pub sha256: Option<String>,
    pub psu_bundle: Option<String>,
}

impl AruPatch {
    /// Candidate carrying only an id, used when the catalog is not consulted.
    pub fn placeholder(bug_number: &str, version: Option<&str>) -> Self {
        Self {
            bug_number: bug_number.to_string(),
            version: version.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.release_id.is_none() && self.download_path.is_none()
    }

    pub fn is_psu(&self) -> bool {
        self.psu_bundle.is_some()
    }

    pub fn is_stack_patch_bundle(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|description| description.to_uppercase().contains(STACK_PATCH_BUNDLE))
    }

    /// Trailing version of the PSU label, e.g. `12.2.1.4.210930` from
    /// `Oracle WebLogic Server 12.2.1.4.210930`.
    pub fn psu_version(&self) -> Option<&str> {
        let label = self.psu_bundle.as_deref()?;
        label
            .rsplit(' ')
            .next()
            .filter(|candidate| candidate.starts_with(|c: char| c.is_ascii_digit()))
    }

    pub fn architecture(&self) -> Option<Architecture> {
        self.platform_id
            .as_deref()
            .and_then(Architecture::from_aru_platform_id)
    }

    /// Generic patches apply everywhere; others only to their platform.
    pub fn applies_to(&self, architecture: Architecture) -> bool {
        match self.platform_id.as_deref() {
            None | Some(GENERIC_PLATFORM_ID) => true,
            Some(id) => Architecture::from_aru_platform_id(id) == Some(architecture),
        }
    }

    pub fn download_url(&self) -> Option<String> {
        let path = self.download_path.as_deref()?;
        match self.download_host.as_deref() {
            Some(host) => Some(format!("{}{}", host.trim_end_matches('/'), path)),
            None => Some(path.to_string()),
        }
    }

    /// `bug_version` key used for this patch in the cache store. Patches
    /// without a version of their own are filed under `installer_version`.
    pub fn cache_key(&self, installer_version: &str) -> CacheKey {
        CacheKey::new(
            self.bug_number.as_str(),
            self.version.as_deref().unwrap_or(installer_version),
        )
    }

    /// Orders PSU candidates: release id first, then the PSU label version.
    pub fn compare_psu(&self, other: &AruPatch) -> Ordering {
        compare_release_ids(self.release_id.as_deref(), other.release_id.as_deref()).then_with(
            || {
                let left = self.psu_version().and_then(|v| Version::from_str(v).ok());
                let right = other.psu_version().and_then(|v| Version::from_str(v).ok());
                left.cmp(&right)
            },
        )
    }
}

fn compare_release_ids(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (
        left.and_then(|id| id.parse::<u64>().ok()),
        right.and_then(|id| id.parse::<u64>().ok()),
    ) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => left.cmp(&right),
    }
}

/// Parse a catalog search response into patch candidates.
pub fn parse_patches(body: &str) -> Result<Vec<AruPatch>> {
    let Some(document) = parse_results(body)? else {
        debug!("Catalog search returned no results");
        return Ok(Vec::new());
    };

    let patches: Vec<AruPatch> = children(document.root_element(), "patch")
        .map(|node| {
            let bug = child(node, "bug");
            let release = child(node, "release");
            let file = child(node, "files").and_then(|files| child(files, "file"));
            let download = file.and_then(|file| child(file, "download_url"));
            let sha256 = file.and_then(|file| {
                children(file, "digest")
                    .find(|digest| {
                        digest
                            .attribute("type")
                            .is_some_and(|kind| kind.eq_ignore_ascii_case("SHA-256"))
                    })
                    .and_then(|digest| digest.text())
                    .map(|text| text.trim().to_lowercase())
            });

            AruPatch {
                bug_number: bug
                    .and_then(|bug| child_text(bug, "number"))
                    .unwrap_or_default(),
                release_id: release.and_then(|r| r.attribute("id")).map(str::to_string),
                version: release
                    .and_then(|r| r.attribute("name"))
                    .map(str::to_string),
                platform_id: child(node, "platform")
                    .and_then(|p| p.attribute("id"))
                    .map(str::to_string),
                description: bug.and_then(|bug| child_text(bug, "abstract")),
                file_name: file.and_then(|file| child_text(file, "name")),
                download_host: download
                    .and_then(|d| d.attribute("host"))
                    .map(str::to_string),
                download_path: download
                    .and_then(|d| d.text())
                    .map(|text| text.trim().to_string()),
                sha256,
                psu_bundle: child_text(node, "psu_bundle"),
            }
        })
        .filter(|patch| {
            if patch.bug_number.is_empty() {
                trace!("Skipping catalog entry without a bug number");
                false
            } else {
                true
            }
        })
        .collect();

    debug!("Parsed {} patches from catalog response", patches.len());
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PSU_RESPONSE: &str = r#"<results>
  <patch>
    <bug><number>32698246</number><abstract>WLS PATCH SET UPDATE 12.2.1.4.210330</abstract></bug>
    <release id="600000000073715" name="12.2.1.4.0"/>
    <platform id="2000">Generic Platform</platform>
    <psu_bundle>Oracle WebLogic Server 12.2.1.4.210330</psu_bundle>
    <files>
      <file>
        <name>p32698246_122140_Generic.zip</name>
        <download_url host="https://updates.oracle.com">/Orion/Services/download/p32698246_122140_Generic.zip?aru=24000000&amp;patch_file=p32698246_122140_Generic.zip</download_url>
        <digest type="SHA-1">0000</digest>
        <digest type="SHA-256">ABCDEF</digest>
      </file>
    </files>
  </patch>
  <patch>
    <bug><number>28186730</number><abstract>OPATCH 13.9.4.2.10 FOR EM 13.4, 13.5 AND FMW/WLS 12.2.1.3.0, 12.2.1.4.0 AND 14.1.1.0.0</abstract></bug>
    <release id="600000000063735" name="13.9.4.2.10"/>
    <platform id="2000">Generic Platform</platform>
  </patch>
</results>"#;

    #[test]
    fn test_parse_patch_fields() {
        let patches = parse_patches(PSU_RESPONSE).unwrap();
        assert_eq!(patches.len(), 2);

        let psu = &patches[0];
        assert_eq!(psu.bug_number, "32698246");
        assert_eq!(psu.release_id.as_deref(), Some("600000000073715"));
        assert_eq!(psu.version.as_deref(), Some("12.2.1.4.0"));
        assert_eq!(psu.file_name.as_deref(), Some("p32698246_122140_Generic.zip"));
        assert_eq!(psu.sha256.as_deref(), Some("abcdef"));
        assert!(psu.is_psu());
        assert_eq!(psu.psu_version(), Some("12.2.1.4.210330"));
        assert_eq!(
            psu.download_url().as_deref(),
            Some(
                "https://updates.oracle.com/Orion/Services/download/p32698246_122140_Generic.zip?aru=24000000&patch_file=p32698246_122140_Generic.zip"
            )
        );
        assert_eq!(psu.architecture(), None);
        assert!(psu.applies_to(Architecture::Arm64));
        assert_eq!(psu.cache_key("14.1.1.0.0").canonical(), "32698246_12.2.1.4.0");

        let opatch = &patches[1];
        assert!(!opatch.is_psu());
        assert_eq!(opatch.download_url(), None);
    }

    #[test]
    fn test_no_results() {
        let body = "<results><error><message>No results found</message></error></results>";
        assert!(parse_patches(body).unwrap().is_empty());
    }

    #[test]
    fn test_stack_patch_bundle_detection() {
        let mut patch = AruPatch::placeholder("33000000", None);
        assert!(!patch.is_stack_patch_bundle());
        patch.description = Some("WebLogic Stack Patch Bundle 12.2.1.4.210420".to_string());
        assert!(patch.is_stack_patch_bundle());
    }

    #[test]
    fn test_compare_psu_orders_by_release_then_label() {
        let mut older = AruPatch::placeholder("1", None);
        older.release_id = Some("9".to_string());
        older.psu_bundle = Some("Oracle WebLogic Server 12.2.1.4.220105".to_string());

        let mut newer_release = older.clone();
        newer_release.release_id = Some("10".to_string());
        assert_eq!(older.compare_psu(&newer_release), Ordering::Less);

        let mut newer_label = older.clone();
        newer_label.psu_bundle = Some("Oracle WebLogic Server 12.2.1.4.220418".to_string());
        assert_eq!(older.compare_psu(&newer_label), Ordering::Less);
        assert_eq!(newer_label.compare_psu(&older), Ordering::Greater);
    }

    #[test]
    fn test_placeholder() {
        let patch = AruPatch::placeholder("12345678", Some("12.2.1.4.0"));
        assert!(patch.is_placeholder());
        assert_eq!(patch.cache_key("14.1.1.0.0").canonical(), "12345678_12.2.1.4.0");

        let unversioned = AruPatch::placeholder("12345678", None);
        assert_eq!(
            unversioned.cache_key("12.2.1.4.0").canonical(),
            "12345678_12.2.1.4.0"
        );
    }
}
