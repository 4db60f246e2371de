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
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::str::FromStr;

/// Dotted numeric version with an optional qualifier after the first `-`,
/// e.g. `12.2.1.4.0` or `14.1.2.0.0-SNAPSHOT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub components: Vec<u64>,
    pub qualifier: Option<String>,
}

impl Version {
    pub fn new(components: Vec<u64>) -> Self {
        Self {
            components,
            qualifier: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// True when `self` is at least `other` under [`Ord`].
    pub fn is_at_least(&self, other: &Version) -> bool {
        self >= other
    }
}

impl FromStr for Version {
    type Err = ImageToolError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ImageToolError::InvalidVersionFormat(s.to_string()));
        }

        let (numeric, qualifier) = match trimmed.split_once('-') {
            Some((numeric, qualifier)) => (numeric, Some(qualifier.to_string())),
            None => (trimmed, None),
        };

        let components = numeric
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| ImageToolError::InvalidVersionFormat(s.to_string()))
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Version {
            components,
            qualifier,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (left, right) in self.components.iter().zip(other.components.iter()) {
            match left.cmp(right) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }

        match self.components.len().cmp(&other.components.len()) {
            Ordering::Equal => {}
            decided => return decided,
        }

        // A release is newer than any qualified build of the same numbers.
        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => left.cmp(right),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
        }

        if let Some(qualifier) = &self.qualifier {
            write!(f, "-{qualifier}")?;
        }

        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Compare two optional version strings. A missing version is older than any
/// present one, including `"0"`.
pub fn compare_versions(left: Option<&str>, right: Option<&str>) -> Result<Ordering> {
    match (left, right) {
        (None, None) => Ok(Ordering::Equal),
        (None, Some(right)) => {
            Version::from_str(right)?;
            Ok(Ordering::Less)
        }
        (Some(left), None) => {
            Version::from_str(left)?;
            Ok(Ordering::Greater)
        }
        (Some(left), Some(right)) => Ok(Version::from_str(left)?.cmp(&Version::from_str(right)?)),
    }
}
