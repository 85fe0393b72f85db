use crate::cli::args::{Command, S3Env};
use crate::cli::params::FetchParams;
use crate::config::load_config;
use crate::download::FetchOptions;
use crate::error::ImgFetchError;
use crate::request::load_requests;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn resolve_command(command: Command) -> Result<FetchParams, ImgFetchError> {
    let Command {
        config_path,
        requests_path,
        output_dir,
        s3_env,
        max_batch_size,
        request_timeout_secs,
        presign_expiry_secs,
        strict,
    } = command;

    let app_config = load_config(config_path.as_deref().map(Path::new))?;

    let max_batch_size = max_batch_size.unwrap_or(app_config.fetch.max_batch_size);
    let request_timeout_secs = request_timeout_secs.unwrap_or(app_config.fetch.request_timeout_secs);
    let presign_expiry_secs = presign_expiry_secs.unwrap_or(app_config.fetch.presign_expiry_secs);

    for (name, value) in [
        ("max-batch-size", max_batch_size as u64),
        ("request-timeout-secs", request_timeout_secs),
        ("presign-expiry-secs", presign_expiry_secs),
    ] {
        if value == 0 {
            return Err(ImgFetchError::CliArgumentValidation {
                details: format!("{name} must be greater than 0."),
            });
        }
    }

    let output_dir = output_dir
        .map(PathBuf::from)
        .or_else(|| app_config.output.path.clone())
        .ok_or_else(|| ImgFetchError::CliArgumentValidation {
            details: "No output directory provided. Pass --output-path or configure output.path."
                .to_string(),
        })?;

    let bucket = match s3_env {
        S3Env::Production => app_config.buckets.production.clone(),
        S3Env::Staging => app_config.buckets.staging.clone(),
    };
    if bucket.is_empty() {
        return Err(ImgFetchError::CliArgumentValidation {
            details: format!("No bucket configured for the {s3_env:?} environment."),
        });
    }

    let requests = load_requests(Path::new(&requests_path))?;

    Ok(FetchParams {
        requests,
        output_dir,
        options: FetchOptions::new(bucket)
            .with_max_batch_size(max_batch_size)
            .with_request_timeout(Duration::from_secs(request_timeout_secs))
            .with_presign_expiry(Duration::from_secs(presign_expiry_secs)),
        s3: app_config.s3,
        strict,
    })
}
