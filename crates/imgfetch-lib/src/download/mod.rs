mod batch;
mod fetcher;
mod path;
mod presence;
mod types;

pub use fetcher::BatchFetcher;
pub use path::{MalformedReason, MalformedRequest, resolve, resolve_all, storage_key};
pub use presence::filter_missing;
pub use types::{
    BatchSummary, FetchFailure, FetchOptions, FetchOutcome, ItemReport, ResolvedRequest,
    RunSummary,
};
