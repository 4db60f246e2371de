use crate::error::{ImageToolError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHECKSUM_CHUNK_SIZE: usize = 8192;

/// Compare the SHA-256 of `file_path` against `expected` (hex, any case).
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<()> {
    let calculated = calculate_sha256(file_path)?;

    if !calculated.eq_ignore_ascii_case(expected.trim()) {
        return Err(ImageToolError::ChecksumMismatch {
            path: file_path.display().to_string(),
            expected: expected.trim().to_lowercase(),
            actual: calculated,
        });
    }

    Ok(())
}

pub fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_calculate_sha256() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        let checksum = calculate_sha256(temp_file.path())?;

        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );

        Ok(())
    }

    #[test]
    fn test_verify_checksum_ignores_case() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Test content")?;

        let expected = "9D9595C5D94FB65B824F56E9999527DBA9542481580D69FEB89056AABAA0AA87";

        assert!(verify_checksum(temp_file.path(), expected).is_ok());

        Ok(())
    }

    #[test]
    fn test_verify_checksum_mismatch() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Test content")?;

        let wrong_checksum = "0000000000000000000000000000000000000000000000000000000000000000";

        let result = verify_checksum(temp_file.path(), wrong_checksum);
        assert!(matches!(
            result,
            Err(ImageToolError::ChecksumMismatch { expected, .. }) if expected == wrong_checksum
        ));

        Ok(())
    }
}
