use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 900;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub buckets: BucketsConfig,
    pub fetch: FetchConfig,
    pub s3: S3Config,
    pub output: OutputConfig,
}

/// Bucket names for the two storage environments the CLI can target.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketsConfig {
    pub production: String,
    pub staging: String,
}

impl Default for BucketsConfig {
    fn default() -> Self {
        Self {
            production: "kin-sms-media-live-ups".to_string(),
            staging: "kin-sms-media-staging".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub max_batch_size: usize,
    /// Upper bound on presigning plus the HTTP fetch of a single object.
    pub request_timeout_secs: u64,
    pub presign_expiry_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3Config {
    pub region: Option<String>,
    /// Custom endpoint, e.g. a MinIO or LocalStack instance.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
}
