use crate::config::S3Config;
use crate::download::FetchOptions;
use crate::request::DownloadRequest;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub requests: Vec<DownloadRequest>,
    pub output_dir: PathBuf,
    pub options: FetchOptions,
    pub s3: S3Config,
    pub strict: bool,
}
