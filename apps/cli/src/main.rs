//! DeckBuilder CLI — batch notebook-to-slides converter.
//!
//! Finds notebooks in per-topic subdirectories, runs `jupyter nbconvert`
//! on each, and collects the HTML decks in a shared directory.

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
