use super::types::ResolvedRequest;
use crate::request::DownloadRequest;
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("URL could not be parsed: {0}")]
    InvalidUrl(String),

    #[error("object key {key:?} has {segments} path segment(s), expected at least 2")]
    TooFewSegments { key: String, segments: usize },

    #[error("object key {key:?} contains an empty path segment")]
    EmptySegment { key: String },

    #[error("object key {key:?} contains a relative path segment")]
    RelativeSegment { key: String },

    #[error("group id {group_id:?} is not a single path component")]
    InvalidGroupId { group_id: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed download request #{index} ({url}): {reason}")]
pub struct MalformedRequest {
    pub index: usize,
    pub url: String,
    pub reason: MalformedReason,
}

/// Extracts the storage key from a request URL: the URL path without its
/// leading `/`. Bare paths (`prefix/name.jpg`) are accepted as-is.
pub fn storage_key(url: &str) -> Result<String, MalformedReason> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => url.to_string(),
        Err(e) => return Err(MalformedReason::InvalidUrl(e.to_string())),
    };
    Ok(path.strip_prefix('/').unwrap_or(&path).to_string())
}

/// Maps a request to the key it is fetched by and the file it is stored at.
///
/// The key keeps its original first segment; only the destination swaps that
/// segment for `group_id`, and only the key's final segment (the file name)
/// is carried over.
pub fn resolve(
    request: &DownloadRequest,
    output_root: &Path,
) -> Result<ResolvedRequest, MalformedReason> {
    let key = storage_key(&request.url)?;

    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 2 {
        return Err(MalformedReason::TooFewSegments {
            segments: segments.len(),
            key,
        });
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(MalformedReason::EmptySegment { key });
    }
    if segments.iter().any(|s| matches!(*s, "." | "..")) {
        return Err(MalformedReason::RelativeSegment { key });
    }

    let group_id = request.group_id.as_str();
    if group_id.is_empty()
        || group_id.contains(['/', '\\'])
        || matches!(group_id, "." | "..")
    {
        return Err(MalformedReason::InvalidGroupId {
            group_id: group_id.to_string(),
        });
    }

    let filename = segments[segments.len() - 1];
    let destination = output_root.join(group_id).join(filename);

    Ok(ResolvedRequest {
        storage_key: key,
        destination,
    })
}

/// Resolves every request up front, failing on the first malformed one.
pub fn resolve_all(
    requests: &[DownloadRequest],
    output_root: &Path,
) -> Result<Vec<ResolvedRequest>, MalformedRequest> {
    requests
        .iter()
        .enumerate()
        .map(|(index, request)| {
            resolve(request, output_root).map_err(|reason| MalformedRequest {
                index,
                url: request.url.clone(),
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn resolve_str(url: &str, group_id: &str) -> Result<ResolvedRequest, MalformedReason> {
        resolve(&DownloadRequest::new(url, group_id), Path::new("/out"))
    }

    #[test]
    fn test_resolve_swaps_group_in_destination_only() {
        let resolved = resolve_str("A/img.jpg", "B").unwrap();

        assert_eq!(resolved.storage_key, "A/img.jpg");
        assert_eq!(resolved.destination, PathBuf::from("/out/B/img.jpg"));
    }

    #[test]
    fn test_resolve_full_https_url() {
        let resolved = resolve_str(
            "https://media.s3.amazonaws.com/e3036eae-eceb-4ac7-8fad-20feeb5c8790/placement-verification-rgb_downstream-camera_0_1646248099276144000.jpg",
            "6386da62-3537-42cf-9e09-d6dfaa6b2024",
        )
        .unwrap();

        assert_eq!(
            resolved.storage_key,
            "e3036eae-eceb-4ac7-8fad-20feeb5c8790/placement-verification-rgb_downstream-camera_0_1646248099276144000.jpg"
        );
        assert_eq!(
            resolved.destination,
            PathBuf::from(
                "/out/6386da62-3537-42cf-9e09-d6dfaa6b2024/placement-verification-rgb_downstream-camera_0_1646248099276144000.jpg"
            )
        );
    }

    #[test]
    fn test_resolve_strips_query_from_absolute_url() {
        let resolved = resolve_str("https://host/A/img.jpg?versionId=3", "B").unwrap();

        assert_eq!(resolved.storage_key, "A/img.jpg");
    }

    #[test]
    fn test_resolve_s3_uri() {
        let resolved = resolve_str("s3://bucket/A/img.jpg", "B").unwrap();

        assert_eq!(resolved.storage_key, "A/img.jpg");
        assert_eq!(resolved.destination, PathBuf::from("/out/B/img.jpg"));
    }

    #[test]
    fn test_resolve_leading_slash_path() {
        let resolved = resolve_str("/A/img.jpg", "B").unwrap();

        assert_eq!(resolved.storage_key, "A/img.jpg");
    }

    #[test]
    fn test_resolve_deep_key_keeps_full_key_and_uses_file_name() {
        let resolved = resolve_str("A/2024/03/img.jpg", "B").unwrap();

        assert_eq!(resolved.storage_key, "A/2024/03/img.jpg");
        assert_eq!(resolved.destination, PathBuf::from("/out/B/img.jpg"));
    }

    #[test]
    fn test_resolve_rejects_single_segment() {
        assert_eq!(
            resolve_str("img.jpg", "B"),
            Err(MalformedReason::TooFewSegments {
                key: "img.jpg".to_string(),
                segments: 1,
            })
        );
        assert!(matches!(
            resolve_str("https://host/img.jpg", "B"),
            Err(MalformedReason::TooFewSegments { segments: 1, .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_empty_segments() {
        assert!(matches!(
            resolve_str("A//img.jpg", "B"),
            Err(MalformedReason::EmptySegment { .. })
        ));
        assert!(matches!(
            resolve_str("A/", "B"),
            Err(MalformedReason::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_relative_segments() {
        assert!(matches!(
            resolve_str("A/..", "B"),
            Err(MalformedReason::RelativeSegment { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_group_ids_escaping_output_root() {
        for group_id in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                matches!(
                    resolve_str("A/img.jpg", group_id),
                    Err(MalformedReason::InvalidGroupId { .. })
                ),
                "group id {group_id:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_unparseable_url() {
        assert!(matches!(
            resolve_str("http://[::1/A/img.jpg", "B"),
            Err(MalformedReason::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_resolve_all_reports_index_of_first_malformed_request() {
        let requests = vec![
            DownloadRequest::new("A/1.jpg", "B"),
            DownloadRequest::new("2.jpg", "B"),
            DownloadRequest::new("3.jpg", "B"),
        ];

        let err = resolve_all(&requests, Path::new("/out")).unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.url, "2.jpg");
    }
}
