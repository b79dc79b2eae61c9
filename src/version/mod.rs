//! Dotted numeric version handling.
//!
//! Versions in this tool come from two untrusted places: artifact filenames
//! (`komga-1.11.2.jar`) and systemd unit files. Neither is guaranteed to be
//! valid semver, so comparison is deliberately lenient: see
//! [`comparison::DottedVersion`] for the exact rules.

pub mod comparison;

pub use comparison::{DottedVersion, compare};
