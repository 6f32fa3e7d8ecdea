//! Assay CLI - data quality test suites over sampled tables

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{run, validators};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Validators(args) => validators::execute(args),
    }
}

/// `RUST_LOG` sets the filter; `--verbose` raises it to debug
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}
