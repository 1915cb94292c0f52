//! End-to-end release publish: fetch, check, extract, map and upload.

use std::path::PathBuf;
use tracing::info;

use crate::archive::check_extract_and_delete;
use crate::config::ScriptConfig;
use crate::error::{Error, Result};
use crate::io::{build_client, fetch_archive};
use crate::publish::{
    DestinationMapper, MimeTable, PresignedPutStore, S3Presigner, plan_uploads, upload_all,
};

/// One publish run, as requested on the command line.
#[derive(Debug, Clone)]
pub struct ReleaseJob {
    pub release_url: String,
    pub zip_path: PathBuf,
    pub bucket: String,
    pub version: String,
    pub dry_run: bool,
}

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    pub extracted: usize,
    pub uploaded: usize,
    pub skipped: usize,
}

/// Publish the release described by `job` to the bucket it names.
pub async fn publish_release(job: &ReleaseJob, config: &ScriptConfig) -> Result<PublishSummary> {
    publish_release_with(job, config, &DestinationMapper::default(), &MimeTable::default()).await
}

/// [`publish_release`] with an explicit package layout and content type table.
pub async fn publish_release_with(
    job: &ReleaseJob,
    config: &ScriptConfig,
    mapper: &DestinationMapper,
    mime: &MimeTable,
) -> Result<PublishSummary> {
    // Fail on a bad target before downloading anything
    let bucket_config = config.bucket(&job.bucket)?;
    if !job.zip_path.is_absolute() {
        return Err(Error::Configuration(format!(
            "archive {} is not an absolute path",
            job.zip_path.display()
        )));
    }

    let client = build_client(config.connect_timeout(), config.request_timeout())?;

    let limits = config.archive_limits();
    fetch_archive(&client, &job.release_url, &job.zip_path, limits.max_size_in_mb).await?;
    let extracted = check_extract_and_delete(&job.zip_path, &limits).await?;

    let destinations = mapper.map(&extracted, &job.version);
    let skipped = extracted.len() - destinations.len();
    let tasks = plan_uploads(destinations, mime)?;

    let presigner = S3Presigner::new(bucket_config, config.presign_expires_in());
    info!(
        bucket = presigner.bucket(),
        files = tasks.len(),
        skipped,
        dry_run = job.dry_run,
        "uploading release artifacts"
    );
    let store = PresignedPutStore::new(presigner, client, config.cache_control_max_age)
        .dry_run(job.dry_run);
    let uploaded = upload_all(&store, tasks, config.max_concurrent_uploads).await?;

    let summary = PublishSummary {
        extracted: extracted.len(),
        uploaded,
        skipped,
    };
    info!(
        version = %job.version,
        uploaded = summary.uploaded,
        skipped = summary.skipped,
        "release published"
    );
    Ok(summary)
}
