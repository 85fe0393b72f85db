mod args;
mod fetch;
mod params;
mod resolved_command;

pub use args::{Args, Command, S3Env, parse_args};
pub use fetch::{run_fetch, run_fetch_with};
pub use params::FetchParams;
pub use resolved_command::resolve_command;
