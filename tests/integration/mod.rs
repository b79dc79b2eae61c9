//! Integration test suite for media-updater
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **cli**: argument handling and exit codes of the binary
//! - **komga_update**: end-to-end artifact updates through the library, with
//!   systemd replaced by a recording fake

mod cli;
mod komga_update;
