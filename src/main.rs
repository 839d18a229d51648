//! Cellcount Summary - command line entry point.

use cellcount_summary::{init_logging, run, CliArgs, LoggingConfig, RunConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::from_env())?;

    let cli = CliArgs::parse();
    let config = RunConfig::from_args(cli)?;
    config.validate()?;

    run(&config)?;

    println!("Output written to {}", config.output_path.display());
    Ok(())
}
