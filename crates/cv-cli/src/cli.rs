//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Caravan - migrate interdependent warehouse schemas in dependency order
#[derive(Parser, Debug)]
#[command(name = "caravan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "caravan.yml")]
    pub config: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover cross-warehouse references and print the processing order
    Analyze(AnalyzeArgs),

    /// Extract, rewrite, package, and optionally deploy every warehouse
    Migrate(MigrateArgs),
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Seed warehouse to start discovery from
    pub seed: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Output formats for analyze
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON report
    Json,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Seed warehouse to start discovery from
    pub seed: String,

    /// Deploy each package to the target after building it
    #[arg(long)]
    pub deploy: bool,

    /// Re-extract warehouses even when a cached snapshot exists
    #[arg(long)]
    pub force_refresh: bool,

    /// Skip the target metadata refresh before deployment
    #[arg(long)]
    pub skip_refresh: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
