use super::DownloadRequest;
use crate::error::ImgFetchError;
use std::path::Path;

/// Reads download requests from a JSON array file, or from JSON Lines when
/// the content does not start with `[`.
pub fn load_requests(path: &Path) -> Result<Vec<DownloadRequest>, ImgFetchError> {
    let content = std::fs::read_to_string(path).map_err(|e| ImgFetchError::RequestsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let requests = parse_requests(&content).map_err(|reason| ImgFetchError::RequestsLoad {
        path: path.to_path_buf(),
        reason,
    })?;

    tracing::info!(
        path = %path.display(),
        count = requests.len(),
        "Loaded download requests"
    );
    Ok(requests)
}

pub fn parse_requests(content: &str) -> Result<Vec<DownloadRequest>, String> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|e| format!("JSON parsing failed: {e}"));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| format!("JSON parsing failed on line {}: {}", idx + 1, e))
        })
        .collect()
}
