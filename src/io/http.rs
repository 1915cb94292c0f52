use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::archive::MB;
use crate::error::{Error, Result, TransferFailure};

/// Build the HTTP client shared by the archive download and every upload.
///
/// Both timeouts apply per request.
pub fn build_client(connect_timeout: Duration, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Download `url` and stream the body verbatim to `dest`, replacing any existing file.
///
/// The download stops with [`Error::TooLarge`] as soon as the advertised
/// `Content-Length` or the bytes received exceed `max_size_in_mb`, so an
/// oversized archive is never held in memory or fully written to disk.
///
/// Returns the number of bytes written.
pub async fn fetch_archive(client: &Client, url: &str, dest: &Path, max_size_in_mb: u64) -> Result<u64> {
    info!(url, dest = %dest.display(), "downloading release archive");

    let mut resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::transfer(url, e))?;

    if !resp.status().is_success() {
        return Err(Error::transfer(url, TransferFailure::Status(resp.status())));
    }

    let too_large = |bytes: u64| Error::TooLarge {
        path: dest.to_path_buf(),
        size_in_mb: bytes / MB,
        max_size_in_mb,
    };
    if let Some(len) = resp.content_length()
        && len / MB > max_size_in_mb
    {
        return Err(too_large(len));
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| Error::io(dest, e))?;
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await.map_err(|e| Error::transfer(url, e))? {
        written += chunk.len() as u64;
        if written / MB > max_size_in_mb {
            drop(file);
            if let Err(e) = tokio::fs::remove_file(dest).await {
                warn!(dest = %dest.display(), error = %e, "failed to remove partial download");
            }
            return Err(too_large(written));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(dest, e))?;
    }
    file.flush().await.map_err(|e| Error::io(dest, e))?;

    info!(bytes = written, "release archive downloaded");
    Ok(written)
}
