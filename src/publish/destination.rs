use std::path::PathBuf;
use tracing::debug;

use crate::archive::ExtractedFiles;

/// Packages published from a telemetry release, highest priority first.
pub const GLEAN_PACKAGES: &[&str] = &["glean", "glean-forUnitTests", "glean-gradle-plugin"];

/// A file paired with the object key it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub source: PathBuf,
    pub key: String,
}

/// Maps extracted files onto the Maven repository layout
/// `<repository_root>/<org_path>/<package>/<version>/<file>`.
#[derive(Debug, Clone)]
pub struct DestinationMapper {
    pub repository_root: String,
    pub org_path: String,
    pub packages: Vec<String>,
}

impl Default for DestinationMapper {
    fn default() -> Self {
        Self {
            repository_root: "maven2".to_string(),
            org_path: "org/mozilla/telemetry".to_string(),
            packages: GLEAN_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl DestinationMapper {
    /// Package owning `file` for `version`: the first package, in priority
    /// order, whose `<package>-<version>` is a prefix of the file name.
    pub fn package_for(&self, file: &str, version: &str) -> Option<&str> {
        self.packages
            .iter()
            .find(|package| file.starts_with(&format!("{package}-{version}")))
            .map(String::as_str)
    }

    pub fn key_for(&self, file: &str, version: &str) -> Option<String> {
        let package = self.package_for(file, version)?;
        Some(format!(
            "{}/{}/{}/{}/{}",
            self.repository_root, self.org_path, package, version, file
        ))
    }

    /// Compute a destination for every extracted file that belongs to a known
    /// package. Files matching no package are skipped.
    pub fn map(&self, files: &ExtractedFiles, version: &str) -> Vec<Destination> {
        files
            .iter()
            .filter_map(|(file, local_path)| match self.key_for(file, version) {
                Some(key) => Some(Destination {
                    source: local_path.clone(),
                    key,
                }),
                None => {
                    debug!(file = %file, version, "no package matches, skipping");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(names: &[&str]) -> ExtractedFiles {
        names
            .iter()
            .map(|n| (n.to_string(), PathBuf::from("/tmp/target.zip.out").join(n)))
            .collect()
    }

    #[test]
    fn test_maps_known_packages_and_skips_the_rest() {
        let files = extracted(&[
            "glean-1.2.3.aar",
            "glean-forUnitTests-1.2.3.jar",
            "unrelated.txt",
        ]);
        let mapper = DestinationMapper {
            packages: vec!["glean".into(), "glean-forUnitTests".into()],
            ..Default::default()
        };

        let destinations = mapper.map(&files, "1.2.3");
        let keys: Vec<&str> = destinations.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "maven2/org/mozilla/telemetry/glean/1.2.3/glean-1.2.3.aar",
                "maven2/org/mozilla/telemetry/glean-forUnitTests/1.2.3/glean-forUnitTests-1.2.3.jar",
            ]
        );
        assert_eq!(
            destinations[0].source,
            PathBuf::from("/tmp/target.zip.out/glean-1.2.3.aar")
        );
    }

    #[test]
    fn test_gradle_plugin_and_checksums() {
        let mapper = DestinationMapper::default();
        assert_eq!(
            mapper.key_for("glean-gradle-plugin-1.2.3.pom.sha1", "1.2.3").as_deref(),
            Some("maven2/org/mozilla/telemetry/glean-gradle-plugin/1.2.3/glean-gradle-plugin-1.2.3.pom.sha1")
        );
        assert_eq!(
            mapper.key_for("glean-1.2.3-sources.jar", "1.2.3").as_deref(),
            Some("maven2/org/mozilla/telemetry/glean/1.2.3/glean-1.2.3-sources.jar")
        );
    }

    #[test]
    fn test_exact_prefix_semantics() {
        let mapper = DestinationMapper::default();
        // Wrong version
        assert_eq!(mapper.key_for("glean-1.2.4.aar", "1.2.3"), None);
        // Prefix match is literal: 1.2.30 starts with 1.2.3
        assert_eq!(mapper.package_for("glean-1.2.30.aar", "1.2.3"), Some("glean"));
        // Files in subdirectories do not start with the package prefix
        assert_eq!(mapper.key_for("libs/glean-1.2.3.aar", "1.2.3"), None);
        assert_eq!(mapper.key_for("glean.aar", "1.2.3"), None);
    }

    #[test]
    fn test_first_listed_package_wins() {
        let mapper = DestinationMapper {
            packages: vec!["lib".into(), "lib-core".into()],
            ..Default::default()
        };
        // "lib-core-core.jar" starts with both "lib-core" and "lib-core-core"
        assert_eq!(mapper.package_for("lib-core-core.jar", "core"), Some("lib"));

        let reversed = DestinationMapper {
            packages: vec!["lib-core".into(), "lib".into()],
            ..Default::default()
        };
        assert_eq!(reversed.package_for("lib-core-core.jar", "core"), Some("lib-core"));
    }
}
