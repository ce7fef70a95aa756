//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_NAME;

/// Minify, gzip and cache web assets for firmware embedding
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the working directory
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG_NAME, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Project root (default: directory of the config file, or cwd)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Minify and gzip assets whose sources changed since the last run
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        select: SelectArgs,

        /// Rebuild every asset, ignoring timestamp records
        #[arg(short, long)]
        force: bool,
    },

    /// Show which assets would be rebuilt, without writing anything
    #[command(visible_alias = "s")]
    Status {
        #[command(flatten)]
        select: SelectArgs,
    },

    /// Remove compressed artifacts and timestamp records
    #[command(visible_alias = "c")]
    Clean {
        #[command(flatten)]
        select: SelectArgs,
    },
}

/// Pipeline selection shared by all subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Pipelines to process (default: all, in config order)
    #[arg(value_name = "PIPELINE")]
    pub pipelines: Vec<String>,
}
