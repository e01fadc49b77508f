mod application;
mod presentation;

use blobvault_core::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::presentation::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    application::run(cli)
}
