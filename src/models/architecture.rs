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
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CPU architecture an installer or patch was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
}

impl Architecture {
    /// Suffix used in cache keys, e.g. `wls_12.2.1.4.0_amd64`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// ARU platform id for patches built for this architecture.
    pub fn aru_platform_id(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "226",
            Architecture::Arm64 => "541",
        }
    }

    pub fn from_aru_platform_id(id: &str) -> Option<Self> {
        match id {
            "226" => Some(Architecture::Amd64),
            "541" => Some(Architecture::Arm64),
            _ => None,
        }
    }
}

impl FromStr for Architecture {
    type Err = ImageToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" | "linux/amd64" => Ok(Architecture::Amd64),
            "arm64" | "aarch64" | "linux/arm64" => Ok(Architecture::Arm64),
            _ => Err(ImageToolError::UnsupportedArchitecture(s.to_string())),
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_aliases() {
        assert_eq!(
            Architecture::from_str("x86_64").unwrap(),
            Architecture::Amd64
        );
        assert_eq!(Architecture::from_str("AMD64").unwrap(), Architecture::Amd64);
        assert_eq!(
            Architecture::from_str("aarch64").unwrap(),
            Architecture::Arm64
        );
        assert_eq!(
            Architecture::from_str("linux/arm64").unwrap(),
            Architecture::Arm64
        );
        assert!(matches!(
            Architecture::from_str("sparcv9"),
            Err(ImageToolError::UnsupportedArchitecture(_))
        ));
    }

    #[test]
    fn test_architecture_display() {
        assert_eq!(Architecture::Amd64.to_string(), "amd64");
        assert_eq!(Architecture::Arm64.to_string(), "arm64");
    }

    #[test]
    fn test_aru_platform_ids() {
        for arch in [Architecture::Amd64, Architecture::Arm64] {
            assert_eq!(
                Architecture::from_aru_platform_id(arch.aru_platform_id()),
                Some(arch)
            );
        }
        assert_eq!(Architecture::from_aru_platform_id("2000"), None);
    }
}
