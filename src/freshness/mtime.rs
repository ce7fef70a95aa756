//! Source modification times as float seconds since the Unix epoch.
//!
//! Timestamp records store the mtime in the same textual shape the legacy
//! Python build scripts used (`str(os.path.getmtime(...))`), so a record
//! written by either side is understood by the other.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get the modification time of a file in seconds since the epoch
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<f64> {
    let modified = path.metadata().and_then(|m| m.modified()).ok()?;
    Some(system_time_secs(modified))
}

/// Convert a `SystemTime` into float seconds (negative before the epoch)
pub fn system_time_secs(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Format an mtime the way Python's `str(float)` does
///
/// Rust's `Display` for `f64` already prints the shortest string that
/// round-trips, but drops the fractional part of integral values
/// (`1700000000` instead of `1700000000.0`).
pub fn format_mtime(secs: f64) -> String {
    let s = secs.to_string();
    if secs.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}

/// Parse the first line of a timestamp record
pub fn parse_mtime(text: &str) -> Option<f64> {
    let value: f64 = text.lines().next()?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_format_integral_keeps_fraction() {
        assert_eq!(format_mtime(1_700_000_000.0), "1700000000.0");
        assert_eq!(format_mtime(0.0), "0.0");
    }

    #[test]
    fn test_format_roundtrips_exactly() {
        let secs = 1_712_345_678.123_456_7;
        assert_eq!(parse_mtime(&format_mtime(secs)), Some(secs));
    }

    #[test]
    fn test_parse_legacy_record() {
        assert_eq!(parse_mtime("1712345678.1234567"), Some(1712345678.1234567));
        assert_eq!(parse_mtime("1712345678.5\nextra"), Some(1712345678.5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_mtime(""), None);
        assert_eq!(parse_mtime("yesterday"), None);
        assert_eq!(parse_mtime("nan"), None);
        assert_eq!(parse_mtime("inf"), None);
    }

    #[test]
    fn test_get_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favicon.ico");
        fs::write(&path, b"\x00\x00\x01\x00").unwrap();

        let when = UNIX_EPOCH + Duration::from_millis(1_700_000_000_250);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(when)
            .unwrap();

        assert_eq!(get_mtime(&path), Some(1_700_000_000.25));
    }

    #[test]
    fn test_get_mtime_nonexistent() {
        assert_eq!(get_mtime(Path::new("/nonexistent/favicon.ico")), None);
    }
}
