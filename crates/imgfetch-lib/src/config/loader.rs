use super::Config;
use crate::error::ImgFetchError;
use config::Config as ConfigBuilder;
use std::path::Path;

pub const ENV_PREFIX: &str = "IMGFETCH";

/// Layers an optional config file and `IMGFETCH_*` environment variables
/// (nested keys separated by `__`) over the built-in defaults.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, ImgFetchError> {
    let mut builder = ConfigBuilder::builder();

    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::from(config_path));
    }

    let config_builder = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
