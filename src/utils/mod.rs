//! Utility modules shared by the pipelines.

pub mod exec;
pub mod path;
