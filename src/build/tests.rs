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

use super::*;
use crate::cache::FileCacheStore;
use crate::test::fixtures::{FakeCatalog, create_test_patch, test_credentials};
use mockall::mock;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

mock! {
    Downloader {}

    impl PatchDownloader for Downloader {
        fn download_patch(
            &self,
            patch: &AruPatch,
            credentials: &Credentials,
            destination_dir: &Path,
        ) -> Result<PathBuf>;
    }
}

struct Fixture {
    temp_dir: TempDir,
    store: FileCacheStore,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCacheStore::open(temp_dir.path(), Duration::from_secs(1)).unwrap();
        Self { temp_dir, store }
    }

    fn cache(&mut self, key: &str, file_name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(file_name);
        fs::write(&path, b"artifact").unwrap();
        self.store.add(key, &path).unwrap();
        path
    }
}

fn offline_downloader() -> MockDownloader {
    let mut downloader = MockDownloader::new();
    downloader.expect_download_patch().never();
    downloader
}

fn wls_request() -> BuildRequest {
    BuildRequest::new(FmwInstallerType::Wls, "12.2.1.4.0")
}

#[test]
fn installers_resolve_from_cache() {
    let mut fixture = Fixture::new();
    let wls = fixture.cache("wls_12.2.1.4.0", "fmw_12.2.1.4.0_wls.zip");
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();

    let resolved = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&wls_request())
        .unwrap();

    assert_eq!(resolved.installer_paths(), vec![&wls]);
    assert!(resolved.patches.is_empty());
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn bundle_installers_keep_definition_order_and_jdk_comes_last() {
    let mut fixture = Fixture::new();
    let fmw = fixture.cache("fmw_12.2.1.4.0", "fmw.zip");
    let soa = fixture.cache("soa_12.2.1.4.0", "soa.zip");
    let jdk = fixture.cache("jdk_8u401_amd64", "jdk.tar.gz");
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = BuildRequest::new(FmwInstallerType::Soa, "12.2.1.4.0");
    request.jdk_version = Some("8u401".to_string());

    let resolved = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&request)
        .unwrap();

    let installers: Vec<InstallerType> = resolved.installers.iter().map(|i| i.installer).collect();
    assert_eq!(
        installers,
        vec![InstallerType::Fmw, InstallerType::Soa, InstallerType::Jdk]
    );
    assert_eq!(resolved.installer_paths(), vec![&fmw, &soa, &jdk]);
    assert_eq!(resolved.installers[2].version, "8u401");
}

#[test]
fn missing_installer_reports_both_keys() {
    let mut fixture = Fixture::new();
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();

    let result = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&wls_request());

    match result {
        Err(ImageToolError::NotFound { key, alternate }) => {
            assert_eq!(key, "wls_12.2.1.4.0");
            assert_eq!(alternate.as_deref(), Some("wls_12.2.1.4.0_amd64"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn invalid_patch_id_fails_before_any_lookup() {
    let mut fixture = Fixture::new();
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = wls_request();
    request.patch_ids = vec!["1234".to_string()];

    let result = BuildResolver::new(&mut fixture.store, &catalog, &downloader).resolve(&request);

    assert!(matches!(result, Err(ImageToolError::InvalidPatchIdFormat(id)) if id == "1234"));
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn invalid_installer_version_is_rejected() {
    let mut fixture = Fixture::new();
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let request = BuildRequest::new(FmwInstallerType::Wls, "latest");

    let result = BuildResolver::new(&mut fixture.store, &catalog, &downloader).resolve(&request);

    assert!(matches!(result, Err(ImageToolError::InvalidVersionFormat(_))));
}

#[test]
fn offline_patch_without_version_uses_installer_version() {
    let mut fixture = Fixture::new();
    fixture.cache("wls_12.2.1.4.0", "wls.zip");
    let patch = fixture.cache("32698246_12.2.1.4.0", "p32698246_122140_Generic.zip");
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = wls_request();
    request.patch_ids = vec!["32698246".to_string()];
    request.credentials = Some(test_credentials());
    request.offline = true;

    let resolved = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&request)
        .unwrap();

    assert_eq!(resolved.patch_paths(), vec![&patch]);
    assert_eq!(resolved.patches[0].patch_id(), "32698246_12.2.1.4.0");
    assert!(!resolved.patches[0].downloaded);
}

#[test]
fn offline_missing_patch_is_not_found() {
    let mut fixture = Fixture::new();
    fixture.cache("wls_12.2.1.4.0", "wls.zip");
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = wls_request();
    request.patch_ids = vec!["32698246_12.2.1.4.0".to_string()];
    request.offline = true;

    let result = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&request);

    assert!(matches!(
        result,
        Err(ImageToolError::NotFound { key, .. }) if key == "32698246_12.2.1.4.0"
    ));
}

#[test]
fn offline_recommended_patches_are_a_config_error() {
    let mut fixture = Fixture::new();
    fixture.cache("wls_12.2.1.4.0", "wls.zip");
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = wls_request();
    request.recommended_patches = true;
    request.credentials = Some(test_credentials());
    request.offline = true;

    let result = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&request);

    assert!(matches!(result, Err(ImageToolError::InvalidConfig(_))));
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn missing_catalog_patch_is_downloaded_and_cached() {
    let mut fixture = Fixture::new();
    fixture.cache("wls_12.2.1.4.0", "wls.zip");
    let cached = fixture.cache("28186730_13.9.4.2.10", "p28186730_139400_Generic.zip");
    let mut catalog = FakeCatalog::new();
    catalog.recommended = vec![
        create_test_patch("32698246", "12.2.1.4.0", "WLS PATCH SET UPDATE 12.2.1.4.210330"),
        create_test_patch("28186730", "13.9.4.2.10", "OPATCH 13.9.4.2.10"),
    ];
    let mut downloader = MockDownloader::new();
    downloader
        .expect_download_patch()
        .times(1)
        .withf(|patch, credentials, _| {
            patch.bug_number == "32698246" && credentials.username() == "user@example.com"
        })
        .returning(|patch, _, destination_dir| {
            let path = destination_dir.join(patch.file_name.clone().unwrap());
            fs::write(&path, b"downloaded").unwrap();
            Ok(path)
        });
    let mut request = wls_request();
    request.recommended_patches = true;
    request.credentials = Some(test_credentials());

    let resolved = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_host(Architecture::Amd64)
        .resolve(&request)
        .unwrap();

    let downloaded = fixture.temp_dir.path().join("p32698246_Generic.zip");
    assert_eq!(resolved.patch_paths(), vec![&downloaded, &cached]);
    assert!(resolved.patches[0].downloaded);
    assert!(!resolved.patches[1].downloaded);
    assert_eq!(fixture.store.get("32698246_12.2.1.4.0"), Some(downloaded));
}

#[test]
fn downloaded_patch_is_recorded_in_registry() {
    let mut fixture = Fixture::new();
    fixture.cache("wls_12.2.1.4.0", "wls.zip");
    let mut registry =
        ArtifactRegistry::open(fixture.temp_dir.path(), Duration::from_secs(1)).unwrap();
    let mut catalog = FakeCatalog::new();
    catalog.by_bug = vec![create_test_patch("32698246", "12.2.1.4.0", "WLS PSU")];
    let mut downloader = MockDownloader::new();
    downloader
        .expect_download_patch()
        .times(1)
        .returning(|patch, _, destination_dir| {
            let path = destination_dir.join(patch.file_name.clone().unwrap());
            fs::write(&path, b"downloaded").unwrap();
            Ok(path)
        });
    let mut request = wls_request();
    request.patch_ids = vec!["32698246".to_string()];
    request.credentials = Some(test_credentials());

    BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_registry(&mut registry)
        .with_host(Architecture::Amd64)
        .resolve(&request)
        .unwrap();

    let record = registry
        .find_patch("32698246", "12.2.1.4.0", Architecture::Amd64)
        .unwrap();
    assert_eq!(record.description.as_deref(), Some("WLS PSU"));
    assert!(fixture.store.get("32698246_12.2.1.4.0").is_some());
}

#[test]
fn registry_fills_in_installers_missing_from_store() {
    let mut fixture = Fixture::new();
    let installer = fixture.temp_dir.path().join("fmw_wls_generic.zip");
    fs::write(&installer, b"artifact").unwrap();
    let mut registry =
        ArtifactRegistry::open(fixture.temp_dir.path(), Duration::from_secs(1)).unwrap();
    registry
        .register_installer(
            &mut fixture.store,
            InstallerType::Wls,
            "12.2.1.4.0",
            None,
            &installer,
            None,
        )
        .unwrap();
    fixture.store.clear().unwrap();
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = wls_request();
    request.architecture = Some(Architecture::Arm64);

    let resolved = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_registry(&mut registry)
        .with_host(Architecture::Amd64)
        .resolve(&request)
        .unwrap();

    assert_eq!(resolved.installer_paths(), vec![&installer]);
}

#[test]
fn registry_fills_in_patches_missing_from_store() {
    let mut fixture = Fixture::new();
    fixture.cache("wls_12.2.1.4.0", "wls.zip");
    let patch_file = fixture.temp_dir.path().join("p32698246_Generic.zip");
    fs::write(&patch_file, b"patch").unwrap();
    let mut registry =
        ArtifactRegistry::open(fixture.temp_dir.path(), Duration::from_secs(1)).unwrap();
    registry
        .register_patch(
            &mut fixture.store,
            "32698246",
            "12.2.1.4.0",
            None,
            &patch_file,
            None,
        )
        .unwrap();
    fixture.store.delete("32698246_12.2.1.4.0").unwrap();
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let mut request = wls_request();
    request.patch_ids = vec!["32698246".to_string()];
    request.offline = true;

    let resolved = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_registry(&mut registry)
        .with_host(Architecture::Amd64)
        .resolve(&request)
        .unwrap();

    assert_eq!(resolved.patch_paths(), vec![&patch_file]);
    assert_eq!(resolved.patches[0].version, "12.2.1.4.0");
    assert!(!resolved.patches[0].downloaded);
}

#[test]
fn registry_policy_can_refuse_generic_installers() {
    let mut fixture = Fixture::new();
    let installer = fixture.temp_dir.path().join("fmw_wls_generic.zip");
    fs::write(&installer, b"artifact").unwrap();
    let mut registry =
        ArtifactRegistry::open(fixture.temp_dir.path(), Duration::from_secs(1)).unwrap();
    registry
        .register_installer(
            &mut fixture.store,
            InstallerType::Wls,
            "12.2.1.4.0",
            None,
            &installer,
            None,
        )
        .unwrap();
    fixture.store.clear().unwrap();
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();
    let strict = |_: InstallerType| false;
    let mut request = wls_request();
    request.architecture = Some(Architecture::Arm64);

    let result = BuildResolver::new(&mut fixture.store, &catalog, &downloader)
        .with_registry(&mut registry)
        .with_policy(&strict)
        .with_host(Architecture::Amd64)
        .resolve(&request);

    assert!(matches!(
        result,
        Err(ImageToolError::NotFound { key, .. }) if key == "wls_12.2.1.4.0_arm64"
    ));
}

#[test]
fn resolve_build_uses_defaults() {
    let mut fixture = Fixture::new();
    let host = get_current_architecture();
    let wls = fixture.cache(&format!("wls_12.2.1.4.0_{host}"), "wls.zip");
    let catalog = FakeCatalog::new();
    let downloader = offline_downloader();

    let resolved = resolve_build(&wls_request(), &mut fixture.store, &catalog, &downloader).unwrap();

    assert_eq!(resolved.installer_paths(), vec![&wls]);
}
