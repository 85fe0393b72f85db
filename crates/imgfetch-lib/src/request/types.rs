use serde::{Deserialize, Serialize};

/// One image to fetch.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DownloadRequest {
    /// Object locator; its path (minus the leading `/`) is the storage key.
    pub url: String,
    /// Replaces the first path segment of the local destination.
    #[serde(alias = "pg_id", alias = "phase_group_id")]
    pub group_id: String,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            group_id: group_id.into(),
        }
    }
}
