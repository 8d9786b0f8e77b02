//! merge-me command-line entry point

mod cli;
mod logging;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    logging::initialize_logging()?;

    tracing::debug!("starting merge-me");

    cli::run(args).await?;

    Ok(())
}
