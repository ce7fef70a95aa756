//! Freshness detection: source mtime compared against a timestamp record.

pub mod mtime;
mod record;

pub use mtime::get_mtime;
pub use record::{Freshness, check, is_up_to_date, write_record};
