//! Keydesk - command-line client for a key-value store service

use std::error::Error;

use clap::Parser;
use keydesk::{Cli, logging, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut stdout = std::io::stdout().lock();
    run(cli, &mut stdout).await?;
    Ok(())
}
