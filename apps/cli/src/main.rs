//! DocAnalyzer CLI: ask questions about a reference document.
//!
//! Runs the analyze server or acts as its terminal front end.

mod ask;
mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
