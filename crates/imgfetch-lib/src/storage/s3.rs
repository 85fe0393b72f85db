use super::{LocatorProvider, StorageError};
use crate::config::S3Config;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

const DEFAULT_REGION: &str = "us-east-1";

/// Presigns `GetObject` requests with an explicitly constructed S3 client.
#[derive(Clone, Debug)]
pub struct S3LocatorProvider {
    client: Client,
}

impl S3LocatorProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the standard AWS provider chain (env, profile,
    /// IMDS), applying the region and endpoint overrides from `s3_config`.
    pub async fn from_config(s3_config: &S3Config) -> Self {
        let region = RegionProviderChain::first_try(s3_config.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        if let Some(endpoint) = s3_config.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_client_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(s3_config.force_path_style)
            .build();

        tracing::debug!(
            region = ?sdk_config.region(),
            endpoint = ?s3_config.endpoint_url,
            force_path_style = s3_config.force_path_style,
            "Created S3 client"
        );
        Self::new(Client::from_conf(s3_client_config))
    }
}

#[async_trait]
impl LocatorProvider for S3LocatorProvider {
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::InvalidExpiry {
                expires_in,
                reason: e.to_string(),
            })?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::Presign {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::trace!(bucket, key, "Presigned GetObject request");
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Credentials;

    fn offline_provider(endpoint: Option<&str>, force_path_style: bool) -> S3LocatorProvider {
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(Credentials::new(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                None,
                None,
                "static",
            ))
            .force_path_style(force_path_style);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        S3LocatorProvider::new(Client::from_conf(builder.build()))
    }

    #[tokio::test]
    async fn test_presign_get_embeds_bucket_key_and_signature() {
        let provider = offline_provider(None, false);

        let url = provider
            .presign_get(
                "images-staging",
                "e3036eae/camera_0_1646248099276144000.jpg",
                Duration::from_secs(600),
            )
            .await
            .expect("presigning is a local operation");

        assert!(url.starts_with("https://images-staging.s3.eu-west-1.amazonaws.com/"));
        assert!(url.contains("/e3036eae/camera_0_1646248099276144000.jpg?"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=600"));
        assert!(url.contains("X-Amz-Credential=AKIDEXAMPLE"));
    }

    #[tokio::test]
    async fn test_presign_get_path_style_custom_endpoint() {
        let provider = offline_provider(Some("http://localhost:9000"), true);

        let url = provider
            .presign_get("media", "a/b.jpg", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/media/a/b.jpg?"), "{url}");
    }

    #[tokio::test]
    async fn test_presign_get_rejects_expiry_over_one_week() {
        let provider = offline_provider(None, false);

        let result = provider
            .presign_get("media", "a/b.jpg", Duration::from_secs(8 * 24 * 60 * 60))
            .await;

        assert!(matches!(result, Err(StorageError::InvalidExpiry { .. })));
    }
}
