use async_trait::async_trait;
use bytes::Bytes;
use eyre::Result;
use imgfetch_lib::download::{BatchFetcher, FetchOptions};
use imgfetch_lib::http::{HttpFetcher, TransportError};
use imgfetch_lib::request::DownloadRequest;
use imgfetch_lib::storage::{LocatorProvider, StorageError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const TEST_BUCKET: &str = "test-media";

/// Locator fake: hands out `mem://<bucket>/<key>` and records each request.
#[derive(Default)]
pub struct RecordingLocator {
    refused_keys: HashSet<String>,
    presigned: Mutex<Vec<(String, String)>>,
}

impl RecordingLocator {
    pub fn refusing(keys: &[&str]) -> Self {
        Self {
            refused_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    /// `(bucket, key)` pairs in the order they were presigned.
    pub fn presigned(&self) -> Vec<(String, String)> {
        self.presigned.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocatorProvider for RecordingLocator {
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.presigned
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        if self.refused_keys.contains(key) {
            return Err(StorageError::Presign {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "AccessDenied".to_string(),
            });
        }
        Ok(format!("mem://{bucket}/{key}"))
    }
}

#[derive(Debug, Clone)]
pub struct HttpCall {
    pub key: String,
    /// GETs that had already finished when this one started.
    pub completed_before_start: usize,
}

/// HTTP fake serving `image:<key>` after a delay, failing for chosen keys and
/// tracking how many requests overlap.
pub struct ScriptedHttpFetcher {
    delay: Duration,
    failing_keys: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
    calls: Mutex<Vec<HttpCall>>,
}

impl ScriptedHttpFetcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing_keys: HashSet::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, keys: &[&str]) -> Self {
        self.failing_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub fn body_for(key: &str) -> Vec<u8> {
    format!("image:{key}").into_bytes()
}

#[async_trait]
impl HttpFetcher for ScriptedHttpFetcher {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
        let key = url
            .strip_prefix("mem://")
            .and_then(|rest| rest.split_once('/'))
            .map(|(_, key)| key.to_string())
            .ok_or_else(|| TransportError::Request(format!("unexpected locator {url}")))?;

        tracing::debug!(key = %key, "Scripted GET");
        self.calls.lock().unwrap().push(HttpCall {
            key: key.clone(),
            completed_before_start: self.completed.load(Ordering::SeqCst),
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.failing_keys.contains(&key) {
            return Err(TransportError::Request("connection reset by peer".to_string()));
        }
        Ok(Bytes::from(body_for(&key)))
    }
}

pub fn build_fetcher(
    locator: Arc<RecordingLocator>,
    http: Arc<ScriptedHttpFetcher>,
    max_batch_size: usize,
) -> BatchFetcher {
    BatchFetcher::new(
        locator,
        http,
        FetchOptions::new(TEST_BUCKET)
            .with_max_batch_size(max_batch_size)
            .with_request_timeout(Duration::from_secs(5)),
    )
}

/// `count` requests `<orig>/img_<n>.jpg` claimed by `group_id`.
pub fn requests(orig: &str, group_id: &str, count: usize) -> Vec<DownloadRequest> {
    (0..count)
        .map(|i| DownloadRequest::new(format!("{orig}/img_{i:03}.jpg"), group_id))
        .collect()
}

/// Writes `records` as a JSON Lines request file named `name` under `dir`.
pub fn write_request_lines(
    dir: &Path,
    name: &str,
    records: &[serde_json::Value],
) -> Result<PathBuf> {
    let mut contents = String::new();
    for record in records {
        contents.push_str(&serde_json::to_string(record)?);
        contents.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Writes `requests` as a single JSON array request file.
pub fn write_request_array(dir: &Path, name: &str, requests: &[DownloadRequest]) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(requests)?)?;
    Ok(path)
}

pub fn write_config(dir: &Path, yaml: &str) -> Result<PathBuf> {
    let path = dir.join("imgfetch.yaml");
    std::fs::write(&path, yaml)?;
    Ok(path)
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().is_file())
                .count()
        })
        .unwrap_or(0)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("imgfetch_lib=debug,imgfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
