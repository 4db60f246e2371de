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

//! Client for the remote patch catalog (ARU).

mod client;
mod patch;
mod release;
mod xml;


pub use client::AruClient;
pub use patch::{AruPatch, GENERIC_PLATFORM_ID, parse_patches};
pub use release::{Release, ReleaseCatalog, parse_releases};

use crate::error::Result;
use crate::installer::FmwInstallerType;
use crate::patches::PatchId;
use std::fmt;

/// Support account used for catalog queries and patch downloads.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Queries answered by the patch catalog.
pub trait PatchCatalog {
    /// Every release the catalog knows. Fetched at most once per instance.
    fn all_releases(&self, credentials: &Credentials) -> Result<&ReleaseCatalog>;

    /// Recommended patches for each product of `bundle` at `version`.
    fn recommended_patches(
        &self,
        bundle: FmwInstallerType,
        version: &str,
        credentials: &Credentials,
    ) -> Result<Vec<AruPatch>>;

    /// The newest PSU for `bundle` at `version`, if any.
    fn latest_psu(
        &self,
        bundle: FmwInstallerType,
        version: &str,
        credentials: &Credentials,
    ) -> Result<Option<AruPatch>>;

    /// Every catalog entry for each bug number. Without credentials each id
    /// becomes a placeholder candidate.
    fn patches_for_bug_numbers(
        &self,
        ids: &[PatchId],
        credentials: Option<&Credentials>,
    ) -> Result<Vec<AruPatch>>;
}
