use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Archive, ExtractedFiles};
use crate::error::{Error, Result};
use crate::zip::ZipFileEntry;

/// Resolve an archive-relative path against `root` without touching the filesystem.
///
/// Returns `None` when the path is absolute, carries a drive or root prefix,
/// climbs above `root` through `..`, or resolves to `root` itself.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (depth > 0).then_some(resolved)
}

impl Archive {
    /// Expand `entries` into [`Archive::extraction_root`].
    ///
    /// `entries` must be the listing returned by [`Archive::inspect`]. Every
    /// target path is resolved before the first byte is written, so an
    /// escaping entry, or two entries landing on the same file, abort the
    /// extraction with nothing on disk.
    pub async fn extract(&self, entries: &[ZipFileEntry]) -> Result<ExtractedFiles> {
        if !self.path.is_absolute() {
            return Err(Error::Configuration(format!(
                "archive {} is not an absolute path",
                self.path.display()
            )));
        }

        let root = self.extraction_root();
        let mut claimed: HashMap<PathBuf, &str> = HashMap::with_capacity(entries.len());
        let mut targets = Vec::with_capacity(entries.len());
        for entry in entries {
            let target =
                resolve_within(&root, &entry.file_name).ok_or_else(|| Error::PathSafety {
                    entry: entry.file_name.clone(),
                    root: root.clone(),
                })?;
            // Distinct names such as `a` and `x/../a` must not share one file
            if let Some(first) = claimed.insert(target.clone(), &entry.file_name) {
                return Err(self.invalid(anyhow::anyhow!(
                    "entries {:?} and {:?} both extract to {}",
                    first,
                    entry.file_name,
                    target.display()
                )));
            }
            targets.push((entry, target));
        }

        if tokio::fs::try_exists(&root).await.unwrap_or(false) {
            warn!(root = %root.display(), "removing stale extraction directory");
            tokio::fs::remove_dir_all(&root)
                .await
                .map_err(|e| Error::io(&root, e))?;
        }
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| Error::io(&root, e))?;

        let mut extracted = ExtractedFiles::new();
        for (entry, target) in targets {
            let data = self
                .extractor
                .extract_to_memory(entry)
                .await
                .map_err(|source| self.invalid(source))?;

            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::io(parent, e))?;
            }
            tokio::fs::write(&target, &data)
                .await
                .map_err(|e| Error::io(&target, e))?;

            debug!(entry = %entry.file_name, target = %target.display(), bytes = data.len(), "extracted");
            extracted.insert(entry.file_name.clone(), target);
        }

        info!(root = %root.display(), files = extracted.len(), "archive expanded");
        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_and_nested() {
        let root = Path::new("/tmp/target.zip.out");
        assert_eq!(
            resolve_within(root, "glean-1.2.3.aar"),
            Some(root.join("glean-1.2.3.aar"))
        );
        assert_eq!(
            resolve_within(root, "libs/./glean-1.2.3.jar"),
            Some(root.join("libs/glean-1.2.3.jar"))
        );
        assert_eq!(
            resolve_within(root, "libs/../glean-1.2.3.pom"),
            Some(root.join("glean-1.2.3.pom"))
        );
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let root = Path::new("/tmp/target.zip.out");
        assert_eq!(resolve_within(root, "../evil.sh"), None);
        assert_eq!(resolve_within(root, "libs/../../evil.sh"), None);
        assert_eq!(resolve_within(root, "/etc/passwd"), None);
        assert_eq!(resolve_within(root, ""), None);
        assert_eq!(resolve_within(root, "libs/.."), None);
    }
}
