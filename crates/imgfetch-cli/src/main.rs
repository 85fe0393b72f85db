use imgfetch_lib::cli::{parse_args, resolve_command, run_fetch};
use imgfetch_lib::error::ImgFetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ImgFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;

    println!("{}", params.options.bucket);
    run_fetch(params).await?;

    println!("Done");
    Ok(())
}
