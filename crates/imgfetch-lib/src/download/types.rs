use crate::http::TransportError;
use crate::storage::StorageError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A request after path resolution: what to fetch and where it lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub storage_key: String,
    pub destination: PathBuf,
}

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub bucket: String,
    pub max_batch_size: usize,
    pub request_timeout: Duration,
    pub presign_expiry: Duration,
}

impl FetchOptions {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            max_batch_size: crate::config::DEFAULT_MAX_BATCH_SIZE,
            request_timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            presign_expiry: Duration::from_secs(crate::config::DEFAULT_PRESIGN_EXPIRY_SECS),
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_presign_expiry(mut self, presign_expiry: Duration) -> Self {
        self.presign_expiry = presign_expiry;
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("locator acquisition failed: {0}")]
    LocatorAcquisition(#[from] StorageError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error at {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { bytes: usize },
    /// The destination appeared after the presence filter ran.
    AlreadyPresent,
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, FetchOutcome::Downloaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemReport {
    pub storage_key: String,
    pub destination: PathBuf,
    pub outcome: FetchOutcome,
}

#[derive(Clone, Debug, Default)]
pub struct BatchSummary {
    pub index: usize,
    /// Items in this slice of the request list.
    pub requested: usize,
    /// Items dropped by the presence filter before fetching.
    pub skipped: usize,
    /// One report per item that went to the fetcher, in request order.
    pub reports: Vec<ItemReport>,
}

impl BatchSummary {
    pub fn downloaded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_downloaded())
            .count()
    }

    pub fn already_present(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == FetchOutcome::AlreadyPresent)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub batches: Vec<BatchSummary>,
}

impl RunSummary {
    pub fn requested(&self) -> usize {
        self.batches.iter().map(|b| b.requested).sum()
    }

    pub fn downloaded(&self) -> usize {
        self.batches.iter().map(BatchSummary::downloaded).sum()
    }

    /// Items not fetched because their destination already existed.
    pub fn skipped(&self) -> usize {
        self.batches
            .iter()
            .map(|b| b.skipped + b.already_present())
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(BatchSummary::failed).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.batches
            .iter()
            .flat_map(|b| b.reports.iter())
            .filter(|r| r.outcome.is_failed())
    }

    pub fn report_for(&self, storage_key: &str) -> Option<&ItemReport> {
        self.batches
            .iter()
            .flat_map(|b| b.reports.iter())
            .find(|r| r.storage_key == storage_key)
    }
}
