//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization and display helpers

pub mod fs;

pub use fs::{is_contained, normalize_path, relative_display};
