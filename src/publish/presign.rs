use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

use crate::config::BucketConfig;
use crate::error::TransferFailure;

/// Issues short-lived URLs that authorize a single PUT of one object.
#[async_trait]
pub trait Presigner: Send + Sync {
    async fn presign_put(&self, key: &str, content_type: &str) -> Result<String, TransferFailure>;
}

/// Presigner backed by the AWS S3 SDK with static credentials.
pub struct S3Presigner {
    client: Client,
    bucket: String,
    expires_in: Duration,
}

impl S3Presigner {
    pub fn new(bucket_config: &BucketConfig, expires_in: Duration) -> Self {
        let credentials = Credentials::new(
            &bucket_config.credentials.id,
            &bucket_config.credentials.key,
            None,
            None,
            "script-config",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(bucket_config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &bucket_config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: bucket_config.buckets.telemetry.clone(),
            expires_in,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl Presigner for S3Presigner {
    async fn presign_put(&self, key: &str, content_type: &str) -> Result<String, TransferFailure> {
        let presigning = PresigningConfig::expires_in(self.expires_in)
            .map_err(|e| TransferFailure::Presign(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| TransferFailure::Presign(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}
