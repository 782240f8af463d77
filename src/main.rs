use clap::Parser;
use ip2country::cli::Args;
use ip2country::logging::init_logging;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_config)?;
    log::info!("#Start main()");

    ip2country::run(args.into_config()).await?;

    Ok(())
}
