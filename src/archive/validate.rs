use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::MB;
use crate::error::{Error, Result};
use crate::io::LocalFileReader;
use crate::zip::ZipParser;

/// Sanity check the archive file itself before trusting anything inside it.
///
/// The size check runs first and truncates to whole megabytes, so a file of
/// `max + 1` MB minus one byte still passes. The format check requires a
/// locatable End of Central Directory record, whatever the file is named.
pub async fn validate_archive(path: &Path, max_size_in_mb: u64) -> Result<()> {
    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::io(path, e))?
        .len();

    let size_in_mb = size / MB;
    if size_in_mb > max_size_in_mb {
        return Err(Error::TooLarge {
            path: path.to_path_buf(),
            size_in_mb,
            max_size_in_mb,
        });
    }

    let reader = LocalFileReader::open(path).map_err(|e| Error::io(path, e))?;
    let (eocd, offset) = ZipParser::new(Arc::new(reader))
        .find_eocd()
        .await
        .map_err(|source| Error::InvalidFormat {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        archive = %path.display(),
        size,
        entries = eocd.total_entries,
        eocd_offset = offset,
        "archive passed validation"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Smallest valid archive: an EOCD record with zero entries.
    const EMPTY_ZIP: [u8; 22] = [
        b'P', b'K', 5, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    #[tokio::test]
    async fn test_empty_archive_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.zip");
        std::fs::write(&path, EMPTY_ZIP).unwrap();

        validate_archive(&path, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_size_truncates_to_megabytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("padded.zip");

        // Just under 2 MB: truncates to 1 MB
        let mut data = vec![0u8; (2 * MB - 1) as usize - EMPTY_ZIP.len()];
        data.extend_from_slice(&EMPTY_ZIP);
        std::fs::write(&path, &data).unwrap();
        validate_archive(&path, 1).await.unwrap();

        let err = validate_archive(&path, 0).await.unwrap_err();
        assert!(matches!(
            err,
            Error::TooLarge {
                size_in_mb: 1,
                max_size_in_mb: 0,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_not_a_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.zip");
        std::fs::write(&path, b"<html>404 not found</html>").unwrap();

        let err = validate_archive(&path, 10).await.unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn test_too_large_checked_before_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.zip");
        std::fs::write(&path, vec![0xAAu8; MB as usize]).unwrap();

        let err = validate_archive(&path, 0).await.unwrap_err();
        assert!(matches!(err, Error::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = validate_archive(&dir.path().join("absent.zip"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
