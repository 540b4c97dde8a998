//! svelte-twig: translate Svelte components into Twig templates.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();

    let summary = orchestrator::run(&args)?;
    if summary.failed() {
        std::process::exit(1);
    }
    Ok(())
}
