//! Platform-specific file operations.

use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Rename `from` over `to`, replacing the destination.
pub fn atomic_rename(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        // On Windows, rename fails if destination exists, so remove it first
        if to.exists() {
            fs::remove_file(to)?;
        }
    }

    fs::rename(from, to)
}

/// Write `contents` to a sibling temp file, flush it to disk, then rename it
/// over `path` so readers never observe a partial file.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    // Clean up any leftover temp file from previous failed attempts
    if temp_path.exists() {
        fs::remove_file(&temp_path)?;
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    atomic_rename(&temp_path, path)?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// True only for paths that exist and are regular files (symlinks followed).
pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Open (creating if needed) a lock file with owner-only permissions.
pub fn prepare_lock_file(lock_path: &Path) -> io::Result<File> {
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::Permissions::from_mode(0o600);
        fs::set_permissions(lock_path, permissions)?;
    }

    Ok(file)
}
