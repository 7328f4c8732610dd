mod backend;
mod chart;
mod cli;
mod logging;
mod model;
mod orchestrator;
mod page;
mod render;
mod text_summary;
#[cfg(test)]
mod testing;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_json = args.json;

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) if is_json => {
            // stdout already carries the snapshot; keep stderr to one line.
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}
