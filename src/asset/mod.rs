//! Asset path mapping, minification and compression.

mod compress;
pub mod minify;
mod route;

pub use compress::{DEFAULT_LEVEL, write_gzip};
pub use minify::{Minified, Minifier};
pub use route::AssetRoute;
