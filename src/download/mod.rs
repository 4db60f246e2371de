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

//! Patch downloads into the cache directory.
//!
//! Files are streamed to a temporary file next to the destination, checked
//! against the catalog's SHA-256 digest when one is published, and only then
//! moved into place.

mod checksum;
mod client;

pub use checksum::{calculate_sha256, verify_checksum};
pub use client::{AttohttpcClient, DEFAULT_TIMEOUT, HttpClient, HttpResponse};

use crate::aru::{AruPatch, Credentials};
use crate::error::{ImageToolError, Result};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Fetches a catalog patch into a directory.
pub trait PatchDownloader {
    fn download_patch(
        &self,
        patch: &AruPatch,
        credentials: &Credentials,
        destination_dir: &Path,
    ) -> Result<PathBuf>;
}

pub struct HttpPatchDownloader {
    pub(crate) http_client: Box<dyn HttpClient>,
}

impl Default for HttpPatchDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPatchDownloader {
    pub fn new() -> Self {
        Self::with_client(Box::new(AttohttpcClient::new()))
    }

    pub fn with_client(http_client: Box<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client.set_timeout(timeout);
        self
    }

    fn validate_response(&self, response: &dyn HttpResponse, url: &str) -> Result<()> {
        match response.status() {
            200..=299 => Ok(()),
            401 | 403 => Err(ImageToolError::InvalidCredentials(format!(
                "Download of {url} was refused"
            ))),
            status => Err(ImageToolError::Download(format!(
                "Download of {url} failed with status: {status}"
            ))),
        }
    }

    fn download_to_file(&self, mut response: Box<dyn HttpResponse>, file: File) -> Result<u64> {
        let mut writer = BufWriter::new(file);
        let mut downloaded = 0u64;
        let mut buffer = vec![0; DOWNLOAD_CHUNK_SIZE];

        loop {
            match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    writer.write_all(&buffer[..n])?;
                    downloaded += n as u64;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        writer.flush()?;
        Ok(downloaded)
    }
}

impl PatchDownloader for HttpPatchDownloader {
    fn download_patch(
        &self,
        patch: &AruPatch,
        credentials: &Credentials,
        destination_dir: &Path,
    ) -> Result<PathBuf> {
        let url = patch.download_url().ok_or_else(|| {
            ImageToolError::Download(format!(
                "Patch {} has no download location",
                patch.bug_number
            ))
        })?;
        let file_name = patch_file_name(patch, &url)?;
        let destination = destination_dir.join(&file_name);

        fs::create_dir_all(destination_dir)?;
        let temp_file = NamedTempFile::new_in(destination_dir)?;

        info!("Downloading patch {} from {url}", patch.bug_number);
        let response = self.http_client.get(&url, Some(credentials))?;
        self.validate_response(response.as_ref(), &url)?;

        let bytes = self.download_to_file(response, temp_file.reopen()?)?;
        debug!("Downloaded {bytes} bytes for patch {}", patch.bug_number);

        if let Some(expected) = &patch.sha256 {
            verify_checksum(temp_file.path(), expected)?;
        }

        temp_file
            .persist(&destination)
            .map_err(|e| ImageToolError::Io(e.error))?;

        Ok(destination)
    }
}

/// File name from the catalog, or the `patch_file` query parameter, or the
/// last path segment of the URL. Only the final path component is kept.
fn patch_file_name(patch: &AruPatch, url: &str) -> Result<String> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let candidate = match &patch.file_name {
        Some(name) => Some(name.as_str()),
        None => {
            let from_query = query
                .split('&')
                .find_map(|pair| pair.strip_prefix("patch_file="))
                .filter(|name| !name.is_empty());
            from_query.or_else(|| path.rsplit('/').next().filter(|name| !name.is_empty()))
        }
    };

    candidate
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ImageToolError::Download(format!(
                "Cannot derive a file name for patch {} from {url}",
                patch.bug_number
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use std::rc::Rc;
    use tempfile::TempDir;

    type Requests = Rc<RefCell<Vec<(String, Option<String>)>>>;

    struct MockHttpClient {
        status: u16,
        body: Vec<u8>,
        requests: Requests,
        timeout: Rc<Cell<Option<Duration>>>,
    }

    impl MockHttpClient {
        fn new(status: u16, body: &[u8]) -> (Self, Requests) {
            let requests = Requests::default();
            (
                Self {
                    status,
                    body: body.to_vec(),
                    requests: Rc::clone(&requests),
                    timeout: Rc::default(),
                },
                requests,
            )
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(
            &self,
            url: &str,
            credentials: Option<&Credentials>,
        ) -> Result<Box<dyn HttpResponse>> {
            self.requests.borrow_mut().push((
                url.to_string(),
                credentials.map(|c| c.username().to_string()),
            ));
            Ok(Box::new(MockHttpResponse {
                status: self.status,
                body: Cursor::new(self.body.clone()),
            }))
        }

        fn set_timeout(&mut self, timeout: Duration) {
            self.timeout.set(Some(timeout));
        }
    }

    struct MockHttpResponse {
        status: u16,
        body: Cursor<Vec<u8>>,
    }

    impl Read for MockHttpResponse {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.body.read(buf)
        }
    }

    impl HttpResponse for MockHttpResponse {
        fn status(&self) -> u16 {
            self.status
        }

        fn header(&self, _name: &str) -> Option<&str> {
            None
        }
    }

    fn catalog_patch(sha256: Option<&str>) -> AruPatch {
        AruPatch {
            bug_number: "32698246".to_string(),
            version: Some("12.2.1.4.0".to_string()),
            release_id: Some("600000000073715".to_string()),
            file_name: Some("p32698246_122140_Generic.zip".to_string()),
            download_host: Some("https://updates.oracle.com".to_string()),
            download_path: Some("/Orion/Services/download/p32698246_122140_Generic.zip".to_string()),
            sha256: sha256.map(str::to_string),
            ..AruPatch::default()
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("user@example.com", "secret")
    }

    #[test]
    fn test_download_verifies_and_places_file() {
        let temp_dir = TempDir::new().unwrap();
        let (client, requests) = MockHttpClient::new(200, b"Hello, World!");
        let downloader = HttpPatchDownloader::with_client(Box::new(client));
        let patch = catalog_patch(Some(
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f",
        ));

        let path = downloader
            .download_patch(&patch, &credentials(), temp_dir.path())
            .unwrap();

        assert_eq!(path, temp_dir.path().join("p32698246_122140_Generic.zip"));
        assert_eq!(fs::read(&path).unwrap(), b"Hello, World!");
        let requests = requests.borrow();
        assert_eq!(
            requests[0].0,
            "https://updates.oracle.com/Orion/Services/download/p32698246_122140_Generic.zip"
        );
        assert_eq!(requests[0].1.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_checksum_mismatch_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let (client, _) = MockHttpClient::new(200, b"tampered");
        let downloader = HttpPatchDownloader::with_client(Box::new(client));
        let patch = catalog_patch(Some(
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f",
        ));

        let result = downloader.download_patch(&patch, &credentials(), temp_dir.path());

        assert!(matches!(
            result,
            Err(ImageToolError::ChecksumMismatch { .. })
        ));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_refused_download_is_credential_error() {
        let temp_dir = TempDir::new().unwrap();
        let (client, _) = MockHttpClient::new(401, b"");
        let downloader = HttpPatchDownloader::with_client(Box::new(client));

        let result = downloader.download_patch(&catalog_patch(None), &credentials(), temp_dir.path());

        assert!(matches!(result, Err(ImageToolError::InvalidCredentials(_))));
    }

    #[test]
    fn test_timeout_is_passed_to_client() {
        let (client, _) = MockHttpClient::new(200, b"");
        let timeout = Rc::clone(&client.timeout);

        let _downloader =
            HttpPatchDownloader::with_client(Box::new(client)).with_timeout(Duration::from_secs(7));

        assert_eq!(timeout.get(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_catalog_file_name_cannot_escape_destination() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("cache");
        let (client, _) = MockHttpClient::new(200, b"Hello, World!");
        let downloader = HttpPatchDownloader::with_client(Box::new(client));
        let mut patch = catalog_patch(None);
        patch.file_name = Some("../../escaped.zip".to_string());

        let path = downloader
            .download_patch(&patch, &credentials(), &destination)
            .unwrap();

        assert_eq!(path, destination.join("escaped.zip"));
        assert!(!temp_dir.path().join("escaped.zip").exists());

        let mut patch = catalog_patch(None);
        patch.file_name = Some("/etc/p32698246.zip".to_string());
        assert_eq!(
            patch_file_name(&patch, "https://updates.oracle.com/download").unwrap(),
            "p32698246.zip"
        );

        patch.file_name = Some("..".to_string());
        assert!(matches!(
            patch_file_name(&patch, "https://updates.oracle.com/download"),
            Err(ImageToolError::Download(_))
        ));
    }

    #[test]
    fn test_patch_without_location_fails() {
        let temp_dir = TempDir::new().unwrap();
        let (client, requests) = MockHttpClient::new(200, b"");
        let downloader = HttpPatchDownloader::with_client(Box::new(client));

        let result = downloader.download_patch(
            &AruPatch::placeholder("12345678", None),
            &credentials(),
            temp_dir.path(),
        );

        assert!(matches!(result, Err(ImageToolError::Download(_))));
        assert!(requests.borrow().is_empty());
    }

    #[test]
    fn test_file_name_from_url() {
        let mut patch = catalog_patch(None);
        patch.file_name = None;

        let name = patch_file_name(
            &patch,
            "https://updates.oracle.com/Orion/Services/download?aru=1&patch_file=p1_Generic.zip",
        )
        .unwrap();
        assert_eq!(name, "p1_Generic.zip");

        let name = patch_file_name(&patch, "https://example.com/files/p2_Generic.zip").unwrap();
        assert_eq!(name, "p2_Generic.zip");
    }
}
