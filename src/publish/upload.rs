use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use std::path::PathBuf;
use tracing::{debug, info};

use super::presign::Presigner;
use crate::error::{Error, Result, TransferFailure};

/// One file to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub source: PathBuf,
    pub destination_key: String,
    pub content_type: String,
}

/// Destination of a single object upload.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, task: &UploadTask) -> Result<()>;
}

/// Uploads each object with an HTTP PUT to a freshly pre-signed URL.
pub struct PresignedPutStore<P: Presigner> {
    presigner: P,
    client: Client,
    cache_control: String,
    dry_run: bool,
}

impl<P: Presigner> PresignedPutStore<P> {
    pub fn new(presigner: P, client: Client, cache_control_max_age: u64) -> Self {
        Self {
            presigner,
            client,
            cache_control: format!("public, max-age={cache_control_max_age}"),
            dry_run: false,
        }
    }

    /// Presign and log every upload, but never send the PUT.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[async_trait]
impl<P: Presigner> ObjectStore for PresignedPutStore<P> {
    async fn put_object(&self, task: &UploadTask) -> Result<()> {
        let key = task.destination_key.as_str();
        let url = self
            .presigner
            .presign_put(key, &task.content_type)
            .await
            .map_err(|e| Error::transfer(key, e))?;

        if self.dry_run {
            info!(
                source = %task.source.display(),
                key,
                content_type = %task.content_type,
                url = %url,
                "dry run, skipping upload"
            );
            return Ok(());
        }

        let body = tokio::fs::read(&task.source)
            .await
            .map_err(|e| Error::io(&task.source, e))?;

        let resp = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, &task.content_type)
            .header(CACHE_CONTROL, &self.cache_control)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::transfer(key, e))?;

        let status = resp.status();
        info!(source = %task.source.display(), key, status = status.as_u16(), "put");
        let text = resp.text().await.map_err(|e| Error::transfer(key, e))?;
        if !text.is_empty() {
            debug!(key, body = %text, "put response body");
        }

        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::NO_CONTENT {
            return Err(Error::transfer(key, TransferFailure::Status(status)));
        }
        Ok(())
    }
}

/// Upload every task with at most `max_in_flight` uploads running at once.
///
/// Results are consumed in completion order. The first failure aborts the
/// batch with [`Error::UploadBatch`]; uploads still in flight are dropped and
/// their outcomes discarded. Objects already written are not rolled back.
///
/// Returns the number of objects uploaded.
pub async fn upload_all<S>(store: &S, tasks: Vec<UploadTask>, max_in_flight: usize) -> Result<usize>
where
    S: ObjectStore + ?Sized,
{
    let total = tasks.len();
    let mut uploads = stream::iter(tasks)
        .map(|task| async move {
            let result = store.put_object(&task).await;
            (task, result)
        })
        .buffer_unordered(max_in_flight.max(1));

    let mut uploaded = 0;
    while let Some((task, result)) = uploads.next().await {
        if let Err(source) = result {
            return Err(Error::UploadBatch {
                key: task.destination_key,
                source: Box::new(source),
            });
        }
        uploaded += 1;
        info!(key = %task.destination_key, uploaded, total, "upload complete");
    }

    Ok(uploaded)
}
