//! Object storage access needed by the fetch pipeline.
//!
//! The pipeline only ever asks storage for a time-limited retrieval locator
//! (a presigned GET URL); the bytes themselves are fetched over plain HTTP.

mod s3;

pub use s3::S3LocatorProvider;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("invalid presign expiry {expires_in:?}: {reason}")]
    InvalidExpiry { expires_in: Duration, reason: String },

    #[error("failed to presign s3://{bucket}/{key}: {reason}")]
    Presign {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// Produces credential-bearing, time-limited URLs for single objects.
#[async_trait]
pub trait LocatorProvider: Send + Sync {
    /// Returns a URL granting GET access to `key` in `bucket` for `expires_in`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
