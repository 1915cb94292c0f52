use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Extension to MIME type table for published artifacts.
///
/// The empty extension covers files without one.
pub const MIME_MAP: &[(&str, &str)] = &[
    ("", "text/plain"),
    (".aar", "application/java-archive"),
    (".apk", "application/vnd.android.package-archive"),
    (".asc", "text/plain"),
    (".beet", "text/plain"),
    (".bundle", "application/octet-stream"),
    (".bz2", "application/octet-stream"),
    (".checksums", "text/plain"),
    (".dmg", "application/x-iso9660-image"),
    (".jar", "application/java-archive"),
    (".json", "application/json"),
    (".mar", "application/octet-stream"),
    (".md5", "text/plain"),
    (".msi", "application/x-msi"),
    (".pkg", "application/x-newton-compatible-pkg"),
    (".pom", "application/xml"),
    (".sha1", "text/plain"),
    (".snap", "application/octet-stream"),
    (".xpi", "application/x-xpinstall"),
];

/// Content type used for extensions missing from the table.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, String>,
    fallback: Option<String>,
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::new(MIME_MAP, Some(DEFAULT_CONTENT_TYPE))
    }
}

impl MimeTable {
    pub fn new(entries: &[(&str, &str)], fallback: Option<&str>) -> Self {
        Self {
            types: entries
                .iter()
                .map(|(ext, mime)| (ext.to_ascii_lowercase(), mime.to_string()))
                .collect(),
            fallback: fallback.map(str::to_string),
        }
    }

    /// Content type for `path`, looked up by its lowercased last extension.
    pub fn content_type(&self, path: &Path) -> Result<&str> {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or_default();

        self.types
            .get(&extension)
            .or(self.fallback.as_ref())
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownContentType(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        let table = MimeTable::default();
        let lookup = |p: &str| table.content_type(Path::new(p)).unwrap().to_string();

        assert_eq!(lookup("glean-1.2.3.jar"), "application/java-archive");
        assert_eq!(lookup("glean-1.2.3.aar"), "application/java-archive");
        assert_eq!(lookup("metrics.json"), "application/json");
        assert_eq!(lookup("glean-1.2.3.pom"), "application/xml");
        assert_eq!(lookup("glean-1.2.3.pom.sha1"), "text/plain");
        assert_eq!(lookup("GLEAN-1.2.3.JAR"), "application/java-archive");
    }

    #[test]
    fn test_fallback() {
        let table = MimeTable::default();
        assert_eq!(
            table.content_type(Path::new("glean-1.2.3.xyz123")).unwrap(),
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(table.content_type(Path::new("LICENSE")).unwrap(), "text/plain");
    }

    #[test]
    fn test_no_fallback_is_an_error() {
        let table = MimeTable::new(&[(".jar", "application/java-archive")], None);
        assert!(table.content_type(Path::new("a.jar")).is_ok());
        assert!(matches!(
            table.content_type(Path::new("a.xyz123")),
            Err(Error::UnknownContentType(_))
        ));
        assert!(matches!(
            table.content_type(Path::new("README")),
            Err(Error::UnknownContentType(_))
        ));
    }
}
