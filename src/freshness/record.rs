//! Timestamp records: the per-asset cache that lets unchanged assets skip
//! the minify/compress work on the next build.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::mtime::{format_mtime, get_mtime, parse_mtime};

/// Read the mtime stored in a timestamp record
///
/// Returns `None` if the record is missing, unreadable or malformed.
pub fn read_record(record: &Path) -> Option<f64> {
    let text = fs::read_to_string(record).ok()?;
    parse_mtime(&text)
}

/// Result of comparing a source against its timestamp record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Freshness {
    /// Record holds exactly the source's current mtime
    UpToDate,
    /// No record, or one that cannot be parsed
    NoRecord,
    /// Source was modified since the record was written
    Changed { recorded: f64, current: f64 },
    /// Source file does not exist
    SourceMissing,
}

impl Freshness {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::UpToDate)
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up to date"),
            Self::NoRecord => write!(f, "no timestamp record"),
            Self::Changed { recorded, current } => write!(
                f,
                "changed ({} -> {})",
                format_mtime(*recorded),
                format_mtime(*current)
            ),
            Self::SourceMissing => write!(f, "source missing"),
        }
    }
}

/// Compare the source's current mtime with the value in `record`
pub fn check(source: &Path, record: &Path) -> Freshness {
    let Some(current) = get_mtime(source) else {
        return Freshness::SourceMissing;
    };
    match read_record(record) {
        None => Freshness::NoRecord,
        Some(recorded) if recorded == current => Freshness::UpToDate,
        Some(recorded) => Freshness::Changed { recorded, current },
    }
}

/// Check whether the artifact guarded by `record` is still current
///
/// The asset is up to date iff the record holds exactly the source's
/// current mtime. A missing source is never up to date: the caller is
/// expected to fail on it when reading the content.
pub fn is_up_to_date(source: &Path, record: &Path) -> bool {
    check(source, record).is_up_to_date()
}

/// Overwrite the record with `mtime`
pub fn write_record(record: &Path, mtime: f64) -> Result<()> {
    if let Some(parent) = record.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(record, format_mtime(mtime))
        .with_context(|| format!("Failed to write timestamp record '{}'", record.display()))
}
