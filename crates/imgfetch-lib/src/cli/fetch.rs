use crate::cli::params::FetchParams;
use crate::download::{BatchFetcher, RunSummary};
use crate::error::ImgFetchError;
use crate::http::{HttpFetcher, ReqwestFetcher};
use crate::storage::{LocatorProvider, S3LocatorProvider};
use std::sync::Arc;

pub async fn run_fetch(params: FetchParams) -> Result<RunSummary, ImgFetchError> {
    let locator = S3LocatorProvider::from_config(&params.s3).await;
    let http = ReqwestFetcher::new(params.options.request_timeout)?;

    run_fetch_with(params, Arc::new(locator), Arc::new(http)).await
}

/// Runs the download with caller-provided storage and HTTP clients.
pub async fn run_fetch_with(
    params: FetchParams,
    locator: Arc<dyn LocatorProvider>,
    http: Arc<dyn HttpFetcher>,
) -> Result<RunSummary, ImgFetchError> {
    let FetchParams {
        requests,
        output_dir,
        options,
        strict,
        ..
    } = params;

    tracing::info!(
        bucket = %options.bucket,
        output = %output_dir.display(),
        "Downloading {} images",
        requests.len()
    );

    let fetcher = BatchFetcher::new(locator, http, options);
    let summary = fetcher.run(&requests, &output_dir).await?;

    for report in summary.failures() {
        tracing::debug!(
            key = %report.storage_key,
            destination = %report.destination.display(),
            outcome = ?report.outcome,
            "Failed item"
        );
    }

    let failed = summary.failed();
    if failed > 0 {
        if strict {
            return Err(ImgFetchError::PartialFailure {
                failed,
                total: summary.requested(),
            });
        }
        tracing::warn!(failed, "Some images failed to download");
    }

    Ok(summary)
}
