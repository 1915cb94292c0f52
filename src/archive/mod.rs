//! Release archive handling: validation, inspection, bomb guard and extraction.
//!
//! Every check here runs before anything is published, so a rejected archive
//! never reaches the object store. Extraction may leave a partial
//! `<archive>.out/` directory behind on failure; nothing outside it is touched.

mod extract;
mod guard;
mod validate;

pub use extract::resolve_within;
pub use guard::guard_entries;
pub use validate::validate_archive;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ArchiveLimits;
use crate::error::{Error, Result};
use crate::io::LocalFileReader;
use crate::zip::{ZipExtractor, ZipFileEntry};

/// Bytes per megabyte as used by every size limit.
pub const MB: u64 = 1024 * 1024;

/// Archive-relative path to the absolute path it was extracted to.
pub type ExtractedFiles = BTreeMap<String, PathBuf>;

/// An opened, format-checked zip archive on local disk.
pub struct Archive {
    path: PathBuf,
    extractor: ZipExtractor<LocalFileReader>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = LocalFileReader::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            extractor: ZipExtractor::new(Arc::new(reader)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the archive is expanded into: `<archive-path>.out`.
    pub fn extraction_root(&self) -> PathBuf {
        let mut root = self.path.as_os_str().to_owned();
        root.push(".out");
        PathBuf::from(root)
    }

    /// List the non-directory members of the archive in Central Directory order.
    ///
    /// This listing is the only source of truth for what the archive contains.
    pub async fn inspect(&self) -> Result<Vec<ZipFileEntry>> {
        let entries = self
            .extractor
            .list_files()
            .await
            .map_err(|source| self.invalid(source))?;

        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().filter(|e| !e.is_directory) {
            if !seen.insert(entry.file_name.clone()) {
                return Err(self.invalid(anyhow::anyhow!(
                    "duplicate entry {:?}",
                    entry.file_name
                )));
            }
            if entry.is_encrypted() {
                return Err(self.invalid(anyhow::anyhow!(
                    "entry {:?} is encrypted",
                    entry.file_name
                )));
            }
            debug!(
                entry = %entry.file_name,
                compressed_size = entry.compressed_size,
                uncompressed_size = entry.uncompressed_size,
                "archive member"
            );
            files.push(entry);
        }

        Ok(files)
    }

    pub(crate) fn invalid(&self, source: anyhow::Error) -> Error {
        Error::InvalidFormat {
            path: self.path.clone(),
            source,
        }
    }
}

/// Validate, inspect, guard and extract the archive at `path`, then delete it.
///
/// Returns the mapping of every extracted member to its local path.
pub async fn check_extract_and_delete(path: &Path, limits: &ArchiveLimits) -> Result<ExtractedFiles> {
    validate_archive(path, limits.max_size_in_mb).await?;

    let archive = Archive::open(path)?;
    let entries = archive.inspect().await?;
    guard_entries(&entries, limits)?;

    let extracted = archive.extract(&entries).await?;
    drop(archive);

    tokio::fs::remove_file(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    info!(archive = %path.display(), files = extracted.len(), "archive extracted and removed");

    Ok(extracted)
}
