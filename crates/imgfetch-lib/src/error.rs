use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImgFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load download requests from {path}: {reason}")]
    RequestsLoad { path: PathBuf, reason: String },

    #[error(transparent)]
    MalformedRequest(#[from] crate::download::MalformedRequest),

    #[error("Invalid fetch options: {details}")]
    InvalidFetchOptions { details: String },

    #[error("Invalid command line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("{failed} of {total} downloads failed")]
    PartialFailure { failed: usize, total: usize },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
