mod cli;

use crate::cli::app::{App, ConsoleArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut app = App::new(ConsoleArgs::parse())?;
    app.run().await?;
    Ok(())
}
