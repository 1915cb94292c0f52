use clap::Parser;
use std::path::PathBuf;

use crate::release::ReleaseJob;

#[derive(Parser, Debug)]
#[command(name = "beetmover")]
#[command(about = "Publish telemetry release artifacts to maven.mozilla.org", long_about = None)]
#[command(after_help = "Example:\n  \
  beetmover --release-url https://example.com/glean-1.2.3.zip \\\n    \
  --script-config script_config.json --bucket maven-staging --version 1.2.3 --dry-run")]
pub struct Cli {
    /// URL of the release zip archive
    #[arg(long, value_name = "URL")]
    pub release_url: String,

    /// JSON or YAML script configuration
    #[arg(long, value_name = "FILE")]
    pub script_config: PathBuf,

    /// Entry of bucket_config to publish to
    #[arg(long, value_name = "NAME")]
    pub bucket: String,

    /// Version of the artifacts being published
    #[arg(long, value_name = "VERSION")]
    pub version: String,

    /// Local path the archive is downloaded to (must be absolute)
    #[arg(long, value_name = "PATH", default_value = "/tmp/target.zip")]
    pub zip_path: PathBuf,

    /// Compute and log every upload without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (error, warn, info, debug, trace), overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn job(&self) -> ReleaseJob {
        ReleaseJob {
            release_url: self.release_url.clone(),
            zip_path: self.zip_path.clone(),
            bucket: self.bucket.clone(),
            version: self.version.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "beetmover",
            "--release-url",
            "https://example.com/glean.zip",
            "--script-config",
            "config.yaml",
            "--bucket",
            "maven-staging",
            "--version",
            "1.2.3",
            "--dry-run",
        ])
        .unwrap();

        let job = cli.job();
        assert_eq!(job.release_url, "https://example.com/glean.zip");
        assert_eq!(job.bucket, "maven-staging");
        assert_eq!(job.version, "1.2.3");
        assert_eq!(job.zip_path, PathBuf::from("/tmp/target.zip"));
        assert!(job.dry_run);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_required_arguments() {
        let err = Cli::try_parse_from(["beetmover", "--version", "1.2.3"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
