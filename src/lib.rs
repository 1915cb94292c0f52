//! # beetmover
//!
//! Publishes the artifacts of a telemetry release to a Maven repository
//! layout in S3.
//!
//! A release is a zip archive published by the build system. The archive is
//! downloaded, checked and extracted locally, then every file that belongs to
//! a known package is uploaded through a pre-signed PUT URL under
//! `maven2/org/mozilla/telemetry/<package>/<version>/<file>`.
//!
//! ## Pipeline
//!
//! 1. [`io::fetch_archive`] downloads the archive
//! 2. [`archive::validate_archive`] checks its size and End of Central Directory
//! 3. [`archive::Archive::inspect`] lists members from the Central Directory
//! 4. [`archive::guard_entries`] rejects oversized or over-compressed members
//! 5. [`archive::Archive::extract`] expands it under `<archive>.out/`
//! 6. [`publish::DestinationMapper`] computes object keys
//! 7. [`publish::upload_all`] uploads with bounded concurrency
//!
//! Nothing is uploaded unless every check in steps 2 to 5 passes.
//!
//! ## Example
//!
//! ```no_run
//! use beetmover::{ReleaseJob, ScriptConfig, publish_release};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> beetmover::Result<()> {
//!     let config = ScriptConfig::load("script_config.json".as_ref())?;
//!     let job = ReleaseJob {
//!         release_url: "https://example.com/glean-1.2.3.zip".to_string(),
//!         zip_path: "/tmp/target.zip".into(),
//!         bucket: "maven-staging".to_string(),
//!         version: "1.2.3".to_string(),
//!         dry_run: true,
//!     };
//!
//!     let summary = publish_release(&job, &config).await?;
//!     println!("uploaded {} files", summary.uploaded);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod publish;
pub mod release;
pub mod zip;

pub use cli::Cli;
pub use config::{ArchiveLimits, ScriptConfig};
pub use error::{Error, Result};
pub use release::{PublishSummary, ReleaseJob, publish_release};
