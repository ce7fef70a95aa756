//! Firmpack - minify, gzip and cache web assets for firmware images.

mod asset;
mod cli;
mod config;
mod freshness;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PackConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors detects whether stderr is a terminal
    }
    logger::set_verbose(cli.verbose);

    let config = PackConfig::load(&cli)?;

    match &cli.command {
        Commands::Run { select, force } => {
            cli::run::run_pipelines(&config, &select.pipelines, *force).map(|_| ())
        }
        Commands::Status { select } => {
            cli::status::report_status(&config, &select.pipelines).map(|_| ())
        }
        Commands::Clean { select } => {
            cli::clean::clean_pipelines(&config, &select.pipelines).map(|_| ())
        }
    }
}
