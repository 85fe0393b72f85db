use super::types::{FetchFailure, FetchOptions, FetchOutcome, ItemReport, ResolvedRequest};
use crate::http::HttpFetcher;
use crate::storage::LocatorProvider;
use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches resolved requests from one bucket into the local tree.
///
/// Storage and HTTP access are injected so the same pipeline runs against
/// S3 in production and against fakes in tests.
#[derive(Clone)]
pub struct BatchFetcher {
    pub(super) locator: Arc<dyn LocatorProvider>,
    pub(super) http: Arc<dyn HttpFetcher>,
    pub(super) options: FetchOptions,
}

impl BatchFetcher {
    pub fn new(
        locator: Arc<dyn LocatorProvider>,
        http: Arc<dyn HttpFetcher>,
        options: FetchOptions,
    ) -> Self {
        Self {
            locator,
            http,
            options,
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Runs every item concurrently and waits for all of them. Reports come
    /// back in the order of `items` regardless of completion order.
    pub async fn fetch_batch(&self, items: Vec<ResolvedRequest>) -> Vec<ItemReport> {
        let mut futs: FuturesUnordered<_> = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| async move { (idx, self.fetch_one(item).await) })
            .collect();

        let mut reports = Vec::with_capacity(futs.len());
        while let Some(report) = futs.next().await {
            reports.push(report);
        }
        reports.sort_by_key(|(idx, _)| *idx);
        reports.into_iter().map(|(_, report)| report).collect()
    }

    pub async fn fetch_one(&self, item: ResolvedRequest) -> ItemReport {
        let outcome = match self.try_fetch_one(&item).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(
                    bucket = %self.options.bucket,
                    key = %item.storage_key,
                    destination = %item.destination.display(),
                    error = %failure,
                    "Failed to download item"
                );
                FetchOutcome::Failed(failure)
            }
        };

        ItemReport {
            storage_key: item.storage_key,
            destination: item.destination,
            outcome,
        }
    }

    async fn try_fetch_one(&self, item: &ResolvedRequest) -> Result<FetchOutcome, FetchFailure> {
        let key = item.storage_key.as_str();
        let destination = item.destination.as_path();

        // Another item in this batch may have written the same destination.
        if destination.is_file() {
            debug!(key, destination = %destination.display(), "Already present, skipping");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchFailure::Io {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        let timeout = self.options.request_timeout;
        let body = tokio::time::timeout(timeout, self.download(key))
            .await
            .map_err(|_| FetchFailure::Timeout(timeout))??;

        let bytes = body.len();
        write_atomically(destination, body)
            .await
            .map_err(|e| FetchFailure::Io {
                path: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(key, destination = %destination.display(), bytes, "Downloaded");
        Ok(FetchOutcome::Downloaded { bytes })
    }

    async fn download(&self, key: &str) -> Result<Bytes, FetchFailure> {
        let locator = self
            .locator
            .presign_get(&self.options.bucket, key, self.options.presign_expiry)
            .await?;
        Ok(self.http.get(&locator).await?)
    }
}

/// Writes `body` next to `destination` and renames it into place, so a crash
/// never leaves a partial file where the presence filter would trust it.
async fn write_atomically(destination: &Path, body: Bytes) -> std::io::Result<()> {
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let parent = destination.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "destination has no parent directory",
            )
        })?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".imgfetch-")
            .suffix(".part")
            .tempfile_in(parent)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&destination).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}
