//! Caravan CLI - dependency-ordered warehouse schema migration

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{analyze, migrate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Analyze(args) => analyze::execute(args, &cli.global).await,
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<commands::common::ExitCode>() {
            std::process::exit(code.0);
        }
        return Err(err);
    }
    Ok(())
}
