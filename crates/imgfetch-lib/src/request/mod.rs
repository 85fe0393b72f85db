mod loader;
mod types;

pub use loader::{load_requests, parse_requests};
pub use types::DownloadRequest;
