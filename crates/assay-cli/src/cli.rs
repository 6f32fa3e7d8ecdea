//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Assay - data quality tests over sampled tables
#[derive(Parser, Debug)]
#[command(name = "assay")]
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

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Suite file to load instead of <project-dir>/assay.yml
    #[arg(short, long, global = true)]
    pub suite: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the suite's test cases
    Run(RunArgs),

    /// List registered validators
    Validators(ValidatorsArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Table names to test (comma-separated, default: all)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Stop on first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Override the connection's per-query timeout
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Arguments for the validators command
#[derive(Args, Debug)]
pub struct ValidatorsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ValidatorsOutput,
}

/// Validator listing formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorsOutput {
    /// One line per validator
    Table,
    /// JSON array
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
