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
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "WLSIMG";

/// Overrides the imagetool home directory (where `config.toml` lives).
pub const HOME_ENV: &str = "WLSIMG_HOME";
/// Cache directory variable understood by earlier releases of the tool.
pub const LEGACY_CACHE_DIR_ENV: &str = "WLSIMG_CACHEDIR";

const DEFAULT_HOME_DIR: &str = ".imagetool";
const DEFAULT_CACHE_DIR: &str = "cache";

pub const DEFAULT_ARU_BASE_URL: &str = "https://updates.oracle.com";
const DEFAULT_RETRY_MAX: u32 = 10;
const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;
const DEFAULT_ARU_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 60;

/// Upper bound for `aru.retry_max`.
pub const MAX_RETRY_MAX: u32 = 100;
/// Upper bound for `aru.retry_interval_ms`.
pub const MAX_RETRY_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageToolConfig {
    #[serde(skip)]
    home: PathBuf,

    /// Directory holding `.metadata`, `artifacts.json` and downloaded patches.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub aru: AruConfig,

    #[serde(default)]
    pub locking: LockingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AruConfig {
    #[serde(default = "default_aru_base_url")]
    pub base_url: String,

    #[serde(default = "default_retry_max")]
    pub retry_max: u32,

    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    #[serde(default = "default_aru_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AruConfig {
    fn default() -> Self {
        Self {
            base_url: default_aru_base_url(),
            retry_max: DEFAULT_RETRY_MAX,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            timeout_secs: DEFAULT_ARU_TIMEOUT_SECS,
        }
    }
}

impl AruConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.retry_max > MAX_RETRY_MAX {
            return Err(ImageToolError::InvalidConfig(format!(
                "aru.retry_max must be between 0 and {MAX_RETRY_MAX}, got {}",
                self.retry_max
            )));
        }
        if self.retry_interval_ms > MAX_RETRY_INTERVAL_MS {
            return Err(ImageToolError::InvalidConfig(format!(
                "aru.retry_interval_ms must be between 0 and {MAX_RETRY_INTERVAL_MS}, got {}",
                self.retry_interval_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockingConfig {
    #[serde(default = "default_lock_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }
}

impl LockingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_aru_base_url() -> String {
    DEFAULT_ARU_BASE_URL.to_string()
}

fn default_retry_max() -> u32 {
    DEFAULT_RETRY_MAX
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

fn default_aru_timeout_secs() -> u64 {
    DEFAULT_ARU_TIMEOUT_SECS
}

fn default_lock_timeout_secs() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}

impl ImageToolConfig {
    /// Load configuration rooted at `home`: `config.toml` first, then
    /// `WLSIMG_*` environment overrides (`__` separates nested keys).
    pub fn new(home: PathBuf) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            log::debug!("Loading config from {config_path:?}");
        } else {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = Config::builder()
            .add_source(
                File::from(config_path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ImageToolError::ConfigError(format!("Failed to load config: {e}")))?;

        let mut config: ImageToolConfig = settings
            .try_deserialize()
            .map_err(|e| ImageToolError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.home = home;

        if config.cache_dir.is_none()
            && let Ok(legacy) = env::var(LEGACY_CACHE_DIR_ENV)
            && !legacy.trim().is_empty()
        {
            config.cache_dir = Some(PathBuf::from(legacy));
        }

        config.aru.validate()?;
        Ok(config)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The artifact cache directory; `~/cache` unless configured.
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_CACHE_DIR))
            .unwrap_or_else(|| self.home.join(DEFAULT_CACHE_DIR))
    }
}

/// Build the configuration for the current user.
pub fn new_config() -> Result<ImageToolConfig> {
    ImageToolConfig::new(resolve_home()?)
}

fn resolve_home() -> Result<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV)
        && !home.trim().is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_HOME_DIR))
        .ok_or_else(|| {
            ImageToolError::ConfigError(format!(
                "Unable to determine home directory; set {HOME_ENV}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        unsafe {
            env::remove_var("WLSIMG_CACHE_DIR");
            env::remove_var("WLSIMG_ARU__RETRY_MAX");
            env::remove_var(LEGACY_CACHE_DIR_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_config_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config = ImageToolConfig::new(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(config.aru.base_url, DEFAULT_ARU_BASE_URL);
        assert_eq!(config.aru.retry_max, DEFAULT_RETRY_MAX);
        assert_eq!(config.aru.retry_interval(), Duration::from_millis(500));
        assert_eq!(config.locking.timeout(), Duration::from_secs(60));
        assert_eq!(config.home(), temp_dir.path());
    }

    #[test]
    #[serial]
    fn test_config_file_values() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            r#"
cache_dir = "/var/cache/imagetool"

[aru]
retry_max = 3
retry_interval_ms = 250
"#,
        )
        .unwrap();

        let config = ImageToolConfig::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(config.cache_dir(), PathBuf::from("/var/cache/imagetool"));
        assert_eq!(config.aru.retry_max, 3);
        assert_eq!(config.aru.retry_interval_ms, 250);
        assert_eq!(config.aru.timeout_secs, DEFAULT_ARU_TIMEOUT_SECS);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[aru]\nretry_max = 3\n",
        )
        .unwrap();

        unsafe {
            env::set_var("WLSIMG_ARU__RETRY_MAX", "7");
        }
        let config = ImageToolConfig::new(temp_dir.path().to_path_buf()).unwrap();
        clear_env();

        assert_eq!(config.aru.retry_max, 7);
    }

    #[test]
    #[serial]
    fn test_legacy_cache_dir_variable() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        unsafe {
            env::set_var(LEGACY_CACHE_DIR_ENV, "/opt/legacy-cache");
        }
        let config = ImageToolConfig::new(temp_dir.path().to_path_buf()).unwrap();
        clear_env();

        assert_eq!(config.cache_dir(), PathBuf::from("/opt/legacy-cache"));
    }

    #[test]
    #[serial]
    fn test_retry_bounds_are_enforced() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[aru]\nretry_max = 1000\n",
        )
        .unwrap();

        let result = ImageToolConfig::new(temp_dir.path().to_path_buf());
        assert!(matches!(result, Err(ImageToolError::InvalidConfig(_))));
    }

    #[test]
    #[serial]
    fn test_negative_retry_interval_is_rejected() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[aru]\nretry_interval_ms = -5\n",
        )
        .unwrap();

        let result = ImageToolConfig::new(temp_dir.path().to_path_buf());
        assert!(matches!(result, Err(ImageToolError::ConfigError(_))));
    }
}
