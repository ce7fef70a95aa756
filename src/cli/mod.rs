//! Command-line interface module.

mod args;
pub mod clean;
pub mod run;
pub mod status;

pub use args::{Cli, Commands};
