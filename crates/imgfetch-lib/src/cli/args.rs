use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;

/// Which storage environment's bucket to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum S3Env {
    Production,
    Staging,
}

#[derive(Debug, Clone)]
pub struct Command {
    pub config_path: Option<String>,
    pub requests_path: String,
    pub output_dir: Option<String>,
    pub s3_env: S3Env,
    pub max_batch_size: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub presign_expiry_secs: Option<u64>,
    pub strict: bool,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "imgfetch",
    version,
    about = "Download S3-hosted images listed in a JSON file into per-group directories"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (YAML or TOML)"
    )]
    config: Option<String>,

    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help = "Path to JSON file with group id and URL keys"
    )]
    file: String,

    #[arg(
        short = 'o',
        long = "output-path",
        value_name = "DIR",
        help = "Path to place downloaded files in (default: output.path from config)"
    )]
    output_path: Option<String>,

    #[arg(
        long = "s3env",
        value_name = "ENV",
        help = "Which S3 bucket to use",
        value_enum,
        default_value_t = S3Env::Staging
    )]
    s3env: S3Env,

    #[arg(
        long = "max-batch-size",
        value_name = "N",
        help = "Number of downloads run concurrently before starting the next batch (default: 100)"
    )]
    max_batch_size: Option<usize>,

    #[arg(
        long = "request-timeout-secs",
        value_name = "SECS",
        help = "Per-image timeout covering presigning and the HTTP fetch (default: 30)"
    )]
    request_timeout_secs: Option<u64>,

    #[arg(
        long = "presign-expiry-secs",
        value_name = "SECS",
        help = "Lifetime of each presigned URL (default: 900)"
    )]
    presign_expiry_secs: Option<u64>,

    #[arg(long = "strict", help = "Exit with an error if any image failed to download")]
    strict: bool,
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    for directive in ["aws_config=warn", "aws_smithy_runtime=warn", "hyper_util=warn"] {
        env_filter = env_filter.add_directive(directive.parse().expect("static directive"));
    }

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(env_filter)
        .init();

    let command = Command {
        config_path: cli.config,
        requests_path: cli.file,
        output_dir: cli.output_path,
        s3_env: cli.s3env,
        max_batch_size: cli.max_batch_size,
        request_timeout_secs: cli.request_timeout_secs,
        presign_expiry_secs: cli.presign_expiry_secs,
        strict: cli.strict,
    };

    Args { command, log_level }
}
