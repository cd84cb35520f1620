//! docdex CLI — build and query local documentation search corpora.
//!
//! Crawls vendor documentation sites into JSON index artifacts and serves
//! BM25 search, page fetch, and section listing over them.

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
