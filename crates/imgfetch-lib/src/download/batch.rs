use super::fetcher::BatchFetcher;
use super::path::resolve_all;
use super::presence::filter_missing;
use super::types::{BatchSummary, RunSummary};
use crate::error::ImgFetchError;
use crate::request::DownloadRequest;
use std::path::Path;

impl BatchFetcher {
    /// Downloads `requests` into `output_root` in consecutive batches of
    /// `max_batch_size`, one batch at a time.
    ///
    /// Every request is validated before anything is fetched; a malformed
    /// request aborts the run. Per-item fetch failures do not: they are
    /// logged and recorded in the returned summary.
    pub async fn run(
        &self,
        requests: &[DownloadRequest],
        output_root: &Path,
    ) -> Result<RunSummary, ImgFetchError> {
        let max_batch_size = self.options.max_batch_size;
        if max_batch_size == 0 {
            return Err(ImgFetchError::InvalidFetchOptions {
                details: "max batch size must be greater than 0".to_string(),
            });
        }

        let resolved = resolve_all(requests, output_root)?;
        tokio::fs::create_dir_all(output_root).await?;

        let batch_count = resolved.len().div_ceil(max_batch_size);
        tracing::info!(
            requests = resolved.len(),
            batches = batch_count,
            bucket = %self.options.bucket,
            "Starting download"
        );

        let mut summary = RunSummary::default();
        for (index, chunk) in resolved.chunks(max_batch_size).enumerate() {
            tracing::info!(batch = index + 1, of = batch_count, size = chunk.len(), "Processing batch");

            let (missing, skipped) = filter_missing(chunk);
            let reports = self.fetch_batch(missing).await;

            let batch = BatchSummary {
                index,
                requested: chunk.len(),
                skipped,
                reports,
            };
            tracing::info!(
                batch = index + 1,
                downloaded = batch.downloaded(),
                skipped = batch.skipped + batch.already_present(),
                failed = batch.failed(),
                "Batch finished"
            );
            summary.batches.push(batch);
        }

        tracing::info!(
            requested = summary.requested(),
            downloaded = summary.downloaded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Download finished"
        );
        Ok(summary)
    }
}
