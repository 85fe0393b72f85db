use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

const DEFAULT_USER_AGENT: &str = concat!("imgfetch/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Fetches the full body behind a URL.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError>;
}

/// [`HttpFetcher`] backed by a pooled `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Presigned URLs carry credentials in the query string; keep them out of logs.
fn redact(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
        let log_url = redact(url);
        trace!(url = log_url, "HTTP GET request starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(
                url = log_url,
                is_connect = e.is_connect(),
                is_timeout = e.is_timeout(),
                "HTTP request failed"
            );
            TransportError::Request(e.without_url().to_string())
        })?;

        let status = response.status();
        debug!(url = log_url, status = status.as_u16(), "HTTP response received");
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: log_url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.without_url().to_string()))?;
        trace!(url = log_url, bytes = body.len(), "HTTP response body read");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{BatchFetcher, FetchFailure, FetchOptions, FetchOutcome};
    use crate::request::DownloadRequest;
    use crate::storage::{LocatorProvider, StorageError};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const ERROR_BODY: &str = "<Error><Code>AccessDenied</Code></Error>";

    /// Presigns to `<base>/<key>` on a local test server.
    struct LocalLocator {
        base: String,
    }

    #[async_trait]
    impl LocatorProvider for LocalLocator {
        async fn presign_get(
            &self,
            _bucket: &str,
            key: &str,
            _expires_in: Duration,
        ) -> Result<String, StorageError> {
            Ok(format!("{}/{key}", self.base))
        }
    }

    /// Answers every connection with `status_line` and a small XML body.
    async fn serve_status(status_line: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{ERROR_BODY}",
                        ERROR_BODY.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_status_error() {
        let base = serve_status("403 Forbidden").await;
        let fetcher = ReqwestFetcher::new(Duration::from_secs(5)).unwrap();

        let result = fetcher.get(&format!("{base}/A/img.jpg?X-Amz-Signature=secret")).await;

        assert_eq!(
            result,
            Err(TransportError::Status {
                status: 403,
                url: format!("{base}/A/img.jpg"),
            })
        );
    }

    #[tokio::test]
    async fn test_success_status_returns_body() {
        let base = serve_status("200 OK").await;
        let fetcher = ReqwestFetcher::new(Duration::from_secs(5)).unwrap();

        let body = fetcher.get(&format!("{base}/A/img.jpg")).await.unwrap();

        assert_eq!(body, Bytes::from_static(ERROR_BODY.as_bytes()));
    }

    #[tokio::test]
    async fn test_forbidden_object_fails_item_and_writes_nothing() {
        let base = serve_status("403 Forbidden").await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = BatchFetcher::new(
            Arc::new(LocalLocator { base }),
            Arc::new(ReqwestFetcher::new(Duration::from_secs(5)).unwrap()),
            FetchOptions::new("bucket").with_request_timeout(Duration::from_secs(10)),
        );

        let summary = fetcher
            .run(&[DownloadRequest::new("A/img.jpg", "B")], dir.path())
            .await
            .expect("item failures must not fail the run");

        let report = summary.report_for("A/img.jpg").unwrap();
        assert!(
            matches!(
                report.outcome,
                FetchOutcome::Failed(FetchFailure::Transport(TransportError::Status {
                    status: 403,
                    ..
                }))
            ),
            "unexpected outcome {:?}",
            report.outcome
        );
        assert!(!dir.path().join("B").join("img.jpg").exists());
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn test_redact_strips_query_string() {
        assert_eq!(
            redact("https://bucket.s3.amazonaws.com/a/b.jpg?X-Amz-Signature=abc"),
            "https://bucket.s3.amazonaws.com/a/b.jpg"
        );
        assert_eq!(redact("http://localhost/a/b.jpg"), "http://localhost/a/b.jpg");
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_request_error() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = ReqwestFetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher
            .get(&format!("http://127.0.0.1:{port}/a/b.jpg?X-Amz-Signature=secret"))
            .await;

        match result {
            Err(TransportError::Request(message)) => assert!(!message.contains("secret")),
            other => panic!("expected request error, got {other:?}"),
        }
    }
}
