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

use crate::cache::KEY_SEPARATOR;
use crate::error::{ImageToolError, Result};
use crate::version::Version;
use std::fmt;
use std::str::FromStr;

pub const MIN_BUG_NUMBER_DIGITS: usize = 8;

/// A patch requested by id: `bug[_version]`, e.g. `28186730` or
/// `28186730_13.9.4.2.10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchId {
    bug_number: String,
    version: Option<String>,
}

impl PatchId {
    pub fn bug_number(&self) -> &str {
        &self.bug_number
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Parse every id, failing on the first malformed one.
    pub fn parse_all<S: AsRef<str>>(ids: &[S]) -> Result<Vec<PatchId>> {
        ids.iter().map(|id| id.as_ref().parse()).collect()
    }
}

impl FromStr for PatchId {
    type Err = ImageToolError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (bug_number, version) = match trimmed.split_once(KEY_SEPARATOR) {
            Some((bug, version)) => (bug, Some(version)),
            None => (trimmed, None),
        };

        if bug_number.len() < MIN_BUG_NUMBER_DIGITS
            || !bug_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ImageToolError::InvalidPatchIdFormat(s.to_string()));
        }

        if let Some(version) = version {
            Version::from_str(version)
                .map_err(|_| ImageToolError::InvalidPatchIdFormat(s.to_string()))?;
        }

        Ok(PatchId {
            bug_number: bug_number.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}{KEY_SEPARATOR}{version}", self.bug_number),
            None => write!(f, "{}", self.bug_number),
        }
    }
}
