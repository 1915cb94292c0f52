use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Script configuration, loaded from a JSON or YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// Target buckets keyed by the name passed on the command line
    pub bucket_config: HashMap<String, BucketConfig>,

    /// Maximum archive size, also the per-entry compressed size cap
    #[serde(default = "default_zip_max_size_in_mb")]
    pub zip_max_size_in_mb: u64,

    /// Maximum uncompressed/compressed ratio for any archive entry
    #[serde(default = "default_zip_max_compression_ratio")]
    pub zip_max_compression_ratio: f64,

    /// `max-age` of the Cache-Control header sent with every upload, in seconds
    #[serde(default = "default_cache_control_max_age")]
    pub cache_control_max_age: u64,

    /// Lifetime of each pre-signed PUT URL, in seconds
    #[serde(default = "default_presign_expires_in")]
    pub presign_expires_in: u64,

    /// Maximum number of uploads in flight at once
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,

    /// HTTP connect timeout, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// HTTP overall request timeout, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Credentials and bucket names for one publishing target.
#[derive(Clone, Deserialize)]
pub struct BucketConfig {
    pub credentials: Credentials,
    pub buckets: Buckets,

    /// AWS region (default: us-east-1)
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores, addressed path-style
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Buckets {
    pub telemetry: String,
}

impl std::fmt::Debug for BucketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketConfig")
            .field("credentials", &self.credentials)
            .field("buckets", &self.buckets)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

fn default_zip_max_size_in_mb() -> u64 {
    10
}

fn default_zip_max_compression_ratio() -> f64 {
    10.0
}

fn default_cache_control_max_age() -> u64 {
    3600 * 4
}

fn default_presign_expires_in() -> u64 {
    1800
}

fn default_max_concurrent_uploads() -> usize {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    300
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl ScriptConfig {
    /// Load configuration from `path`.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
        .map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("failed to load {}: {msg}", path.display()))
            }
            other => other,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Reject limits that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_uploads == 0 {
            return Err(Error::Configuration(
                "max_concurrent_uploads must be at least 1".into(),
            ));
        }
        let ratio = self.zip_max_compression_ratio;
        if ratio.is_nan() || ratio <= 0.0 {
            return Err(Error::Configuration(format!(
                "zip_max_compression_ratio must be positive, got {ratio}"
            )));
        }
        if self.presign_expires_in == 0 {
            return Err(Error::Configuration(
                "presign_expires_in must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    /// Look up the publishing target named `bucket`.
    pub fn bucket(&self, bucket: &str) -> Result<&BucketConfig> {
        self.bucket_config.get(bucket).ok_or_else(|| {
            Error::Configuration(format!("no bucket_config entry for bucket {bucket:?}"))
        })
    }

    pub fn archive_limits(&self) -> ArchiveLimits {
        ArchiveLimits {
            max_size_in_mb: self.zip_max_size_in_mb,
            max_compression_ratio: self.zip_max_compression_ratio,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn presign_expires_in(&self) -> Duration {
        Duration::from_secs(self.presign_expires_in)
    }
}

/// Limits applied to a downloaded archive before anything is extracted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchiveLimits {
    pub max_size_in_mb: u64,
    pub max_compression_ratio: f64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_size_in_mb: default_zip_max_size_in_mb(),
            max_compression_ratio: default_zip_max_compression_ratio(),
        }
    }
}
