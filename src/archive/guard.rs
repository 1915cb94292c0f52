use super::MB;
use crate::config::ArchiveLimits;
use crate::error::{Error, GuardViolation, Result};
use crate::zip::ZipFileEntry;

/// Reject the archive if any entry looks like a decompression bomb.
///
/// Entries are checked in archive order and the first violation wins, so the
/// error is deterministic for a given archive. The archive size cap doubles as
/// a per-entry cap on compressed size.
pub fn guard_entries(entries: &[ZipFileEntry], limits: &ArchiveLimits) -> Result<()> {
    for entry in entries {
        let size_in_mb = entry.compressed_size / MB;
        if size_in_mb > limits.max_size_in_mb {
            return Err(suspicious(
                entry,
                GuardViolation::CompressedSize {
                    size_in_mb,
                    max_size_in_mb: limits.max_size_in_mb,
                },
            ));
        }

        let ratio = entry.compression_ratio();
        if ratio > limits.max_compression_ratio {
            return Err(suspicious(
                entry,
                GuardViolation::CompressionRatio {
                    ratio,
                    max_ratio: limits.max_compression_ratio,
                },
            ));
        }
    }

    Ok(())
}

fn suspicious(entry: &ZipFileEntry, violation: GuardViolation) -> Error {
    Error::SuspiciousEntry {
        entry: entry.file_name.clone(),
        compressed_size: entry.compressed_size,
        violation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::CompressionMethod;

    fn entry(name: &str, compressed_size: u64, uncompressed_size: u64) -> ZipFileEntry {
        ZipFileEntry {
            file_name: name.to_string(),
            compression_method: CompressionMethod::Deflate,
            compressed_size,
            uncompressed_size,
            crc32: 0,
            lfh_offset: 0,
            flags: 0,
            is_directory: false,
        }
    }

    #[test]
    fn test_reasonable_entries_pass() {
        let entries = [
            entry("glean-1.2.3.aar", 4000, 12000),
            entry("glean-1.2.3.pom", 900, 900),
            entry("empty.txt", 0, 0),
        ];
        guard_entries(&entries, &ArchiveLimits::default()).unwrap();
    }

    #[test]
    fn test_zero_compressed_size_is_infinite_ratio() {
        let entries = [entry("bomb.bin", 0, 1)];
        let err = guard_entries(&entries, &ArchiveLimits::default()).unwrap_err();
        match err {
            Error::SuspiciousEntry {
                entry,
                compressed_size,
                violation: GuardViolation::CompressionRatio { ratio, .. },
            } => {
                assert_eq!(entry, "bomb.bin");
                assert_eq!(compressed_size, 0);
                assert!(ratio.is_infinite());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ratio_limit_is_exclusive() {
        let limits = ArchiveLimits::default();
        guard_entries(&[entry("ok.jar", 100, 1000)], &limits).unwrap();

        let err = guard_entries(&[entry("zeros.jar", 100, 1001)], &limits).unwrap_err();
        assert!(matches!(
            err,
            Error::SuspiciousEntry {
                violation: GuardViolation::CompressionRatio { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_compressed_size_cap() {
        let limits = ArchiveLimits {
            max_size_in_mb: 1,
            max_compression_ratio: 10.0,
        };
        // 1.99 MB truncates to 1 MB and passes
        guard_entries(&[entry("a.aar", 2 * MB - 1, 2 * MB - 1)], &limits).unwrap();

        let err = guard_entries(&[entry("b.aar", 2 * MB, 2 * MB)], &limits).unwrap_err();
        assert!(matches!(
            err,
            Error::SuspiciousEntry {
                violation: GuardViolation::CompressedSize {
                    size_in_mb: 2,
                    max_size_in_mb: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn test_first_violation_in_archive_order() {
        let entries = [
            entry("fine.pom", 10, 10),
            entry("second.bin", 1, 500),
            entry("third.bin", 0, 500),
        ];
        let err = guard_entries(&entries, &ArchiveLimits::default()).unwrap_err();
        assert!(matches!(err, Error::SuspiciousEntry { ref entry, .. } if entry == "second.bin"));
    }
}
