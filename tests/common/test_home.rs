use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated imagetool home with its own cache directory.
///
/// The directory is removed when the guard is dropped.
pub struct TestHomeGuard {
    temp_dir: TempDir,
}

impl TestHomeGuard {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create test home directory");
        fs::create_dir_all(temp_dir.path().join(".imagetool"))
            .expect("Failed to create .imagetool directory");
        fs::create_dir_all(temp_dir.path().join("cache")).expect("Failed to create cache directory");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn imagetool_home(&self) -> PathBuf {
        self.path().join(".imagetool")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.path().join("cache")
    }

    /// Write `contents` to `name` under the test home and return its path.
    pub fn create_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// `imagetool` command bound to this home and cache directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut command = assert_cmd::Command::new(env!("CARGO_BIN_EXE_imagetool"));
        command
            .env("WLSIMG_HOME", self.imagetool_home())
            .env("WLSIMG_CACHE_DIR", self.cache_dir())
            .env("WLSIMG_ARU__RETRY_MAX", "0")
            .env_remove("WLSIMG_CACHEDIR")
            .env_remove("RUST_LOG");
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_and_cleans_up_directory() {
        let test_path = {
            let guard = TestHomeGuard::new();
            let path = guard.path().to_path_buf();
            assert!(path.exists());
            assert!(guard.cache_dir().exists());
            path
        };
        assert!(!test_path.exists());
    }
}
