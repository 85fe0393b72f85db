pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod request;
pub mod storage;

pub use config::Config;
pub use error::ImgFetchError;
