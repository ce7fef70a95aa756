//! Gzip compression of asset content.

use anyhow::{Context, Result};
use flate2::{Compression, write::GzEncoder};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Compression level used when the config does not set one.
///
/// Matches the default of Python's `gzip.open`, which produced the
/// artifacts this tool replaces.
pub const DEFAULT_LEVEL: u32 = 9;

/// Gzip `data` in memory.
///
/// The header carries no file name and a zero mtime, so equal input always
/// gives equal output bytes.
pub fn gzip_bytes(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Compress `data` and replace the artifact at `dest`.
///
/// The artifact is written next to `dest` and renamed into place, so a
/// failed run never leaves a truncated file at the destination.
pub fn write_gzip(data: &[u8], dest: &Path, level: u32) -> Result<()> {
    let compressed = gzip_bytes(data, level)
        .with_context(|| format!("Failed to compress '{}'", dest.display()))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }

    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, &compressed)
        .with_context(|| format!("Failed to write '{}'", tmp.display()))?;
    if let Err(err) = fs::rename(tmp, dest) {
        let _ = fs::remove_file(tmp);
        return Err(err)
            .with_context(|| format!("Failed to move artifact into '{}'", dest.display()));
    }
    Ok(())
}
