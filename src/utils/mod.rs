//! Filesystem and host helpers.

pub mod fs;
pub mod platform;

pub use platform::{is_root, require_root};
