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

use crate::error::{ImageToolError, Result};
use std::fmt;
use std::str::FromStr;

/// A single installer file that goes into an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstallerType {
    Wls,
    WlsSlim,
    WlsDev,
    Fmw,
    Osb,
    Soa,
    B2b,
    Mft,
    Idm,
    Oam,
    Ohs,
    Db19,
    Odi,
    Oud,
    Oid,
    Wcc,
    Wcp,
    Wcs,
    Jdk,
}

impl InstallerType {
    pub const ALL: [InstallerType; 19] = [
        InstallerType::Wls,
        InstallerType::WlsSlim,
        InstallerType::WlsDev,
        InstallerType::Fmw,
        InstallerType::Osb,
        InstallerType::Soa,
        InstallerType::B2b,
        InstallerType::Mft,
        InstallerType::Idm,
        InstallerType::Oam,
        InstallerType::Ohs,
        InstallerType::Db19,
        InstallerType::Odi,
        InstallerType::Oud,
        InstallerType::Oid,
        InstallerType::Wcc,
        InstallerType::Wcp,
        InstallerType::Wcs,
        InstallerType::Jdk,
    ];

    /// Id used as the first part of the cache key.
    pub fn cache_id(&self) -> &'static str {
        match self {
            InstallerType::Wls => "wls",
            InstallerType::WlsSlim => "wlsslim",
            InstallerType::WlsDev => "wlsdev",
            InstallerType::Fmw => "fmw",
            InstallerType::Osb => "osb",
            InstallerType::Soa => "soa",
            InstallerType::B2b => "b2b",
            InstallerType::Mft => "mft",
            InstallerType::Idm => "idm",
            InstallerType::Oam => "oam",
            InstallerType::Ohs => "ohs",
            InstallerType::Db19 => "db19",
            InstallerType::Odi => "odi",
            InstallerType::Oud => "oud",
            InstallerType::Oid => "oid",
            InstallerType::Wcc => "wcc",
            InstallerType::Wcp => "wcp",
            InstallerType::Wcs => "wcs",
            InstallerType::Jdk => "jdk",
        }
    }

    /// Installers that ship platform binaries and exist once per architecture.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            InstallerType::Jdk | InstallerType::Ohs | InstallerType::Db19
        )
    }
}

impl FromStr for InstallerType {
    type Err = ImageToolError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        InstallerType::ALL
            .into_iter()
            .find(|installer| installer.cache_id() == wanted)
            .ok_or_else(|| ImageToolError::UnknownInstallerType(s.to_string()))
    }
}

impl fmt::Display for InstallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_id())
    }
}
