mod loader;
mod model;

pub use loader::{ENV_PREFIX, load_config};
pub use model::{
    BucketsConfig, Config, DEFAULT_MAX_BATCH_SIZE, DEFAULT_PRESIGN_EXPIRY_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, FetchConfig, OutputConfig, S3Config,
};
