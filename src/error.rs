//! Error taxonomy shared by every stage of a release publish.
//!
//! Each variant maps to one fixed process exit code through
//! [`Error::exit_code`], so the binary never has to guess how to terminate.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transfer of {target} failed: {source}")]
    Transfer {
        target: String,
        #[source]
        source: TransferFailure,
    },

    #[error("archive {path} is too big: {size_in_mb} MB, max accepted size (in MB): {max_size_in_mb}")]
    TooLarge {
        path: PathBuf,
        size_in_mb: u64,
        max_size_in_mb: u64,
    },

    #[error("archive {path} is not a valid zip file: {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("archive entry {entry:?} (compressed size {compressed_size} bytes) {violation}")]
    SuspiciousEntry {
        entry: String,
        compressed_size: u64,
        violation: GuardViolation,
    },

    #[error("archive entry {entry:?} escapes extraction root {root}")]
    PathSafety { entry: String, root: PathBuf },

    #[error("unable to discover a content type for {0}")]
    UnknownContentType(PathBuf),

    #[error("upload batch aborted at {key}: {source}")]
    UploadBatch {
        key: String,
        #[source]
        source: Box<Error>,
    },
}

/// Why a single network exchange did not succeed.
#[derive(Debug, Error)]
pub enum TransferFailure {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("bad status {0}")]
    Status(reqwest::StatusCode),

    #[error("presigning failed: {0}")]
    Presign(String),
}

/// The limit a suspicious archive entry violated.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardViolation {
    CompressedSize { size_in_mb: u64, max_size_in_mb: u64 },
    CompressionRatio { ratio: f64, max_ratio: f64 },
}

impl std::fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardViolation::CompressedSize {
                size_in_mb,
                max_size_in_mb,
            } => write!(
                f,
                "is too big: {size_in_mb} MB compressed, max accepted size (in MB): {max_size_in_mb}"
            ),
            GuardViolation::CompressionRatio { ratio, max_ratio } => write!(
                f,
                "has a suspicious compression ratio: found {ratio}, max accepted {max_ratio}"
            ),
        }
    }
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn transfer(target: impl Into<String>, source: impl Into<TransferFailure>) -> Self {
        Error::Transfer {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Code 2 is left to clap for command-line usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Io { .. } => 1,
            Error::Configuration(_) => 3,
            Error::Transfer { .. } => 4,
            Error::TooLarge { .. } => 5,
            Error::InvalidFormat { .. } => 6,
            Error::SuspiciousEntry { .. } => 7,
            Error::PathSafety { .. } => 8,
            Error::UnknownContentType(_) => 9,
            Error::UploadBatch { .. } => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            Error::io("/tmp/x", std::io::Error::other("boom")),
            Error::Configuration("missing".into()),
            Error::transfer("https://example.com", TransferFailure::Presign("no".into())),
            Error::TooLarge {
                path: "/tmp/a.zip".into(),
                size_in_mb: 11,
                max_size_in_mb: 10,
            },
            Error::InvalidFormat {
                path: "/tmp/a.zip".into(),
                source: anyhow::anyhow!("bad"),
            },
            Error::SuspiciousEntry {
                entry: "a".into(),
                compressed_size: 0,
                violation: GuardViolation::CompressionRatio {
                    ratio: f64::INFINITY,
                    max_ratio: 10.0,
                },
            },
            Error::PathSafety {
                entry: "../a".into(),
                root: "/tmp/a.zip.out".into(),
            },
            Error::UnknownContentType("/tmp/a.xyz".into()),
            Error::UploadBatch {
                key: "k".into(),
                source: Box::new(Error::Configuration("inner".into())),
            },
        ];

        let mut codes: Vec<u8> = errors.iter().map(Error::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0 && c != 2));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_upload_batch_keeps_source() {
        let err = Error::UploadBatch {
            key: "maven2/x".into(),
            source: Box::new(Error::transfer(
                "maven2/x",
                TransferFailure::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            )),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("500"));
    }

    #[test]
    fn test_infinite_ratio_message() {
        let violation = GuardViolation::CompressionRatio {
            ratio: f64::INFINITY,
            max_ratio: 10.0,
        };
        assert!(violation.to_string().contains("inf"));
    }
}
