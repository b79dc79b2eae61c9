//! Banner and configuration listing for `--version` and `--help`.

use crate::config::UpdaterConfig;
use crate::services::Service;
use std::fmt::Write;

const BIN: &str = env!("CARGO_PKG_NAME");

/// Boxed title with the version, plus a one-line description.
pub fn logo() -> String {
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    let mut out = String::new();
    out.push_str("╭─────────────────────────────────────────────────────────────╮\n");
    out.push_str("│                                                             │\n");
    let _ = writeln!(out, "│              Media Server Service Updater {version:<17} │");
    out.push_str("│                                                             │\n");
    out.push_str("╰─────────────────────────────────────────────────────────────╯\n");
    out.push('\n');
    out.push_str("  A utility to automatically update media server services to\n");
    out.push_str("  their latest versions and clean up old artifacts.\n");
    out
}

/// The paths and settings each service will use.
pub fn configuration(config: &UpdaterConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CONFIGURATION");
    let _ = writeln!(out, "  Source: {}", config.source_description());
    let _ = writeln!(out);
    let _ = writeln!(out, "  Komga:");
    let _ = writeln!(out, "    Service File: {}", config.komga.service_file.display());
    let _ = writeln!(out, "    Directory:    {}", config.komga.artifact_dir.display());
    let _ = writeln!(out, "    Strategy:     {}", config.komga.strategy);
    let _ = writeln!(out, "    Repository:   {}", config.komga.repository);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Immich:");
    let _ = writeln!(out, "    Directory:    {}", config.immich.compose_dir.display());
    let _ = writeln!(out);
    let _ = writeln!(out, "  Jellyfin:");
    let _ = writeln!(out, "    Package:      {}", config.jellyfin.package);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Lock File:      {}", config.lock_file.display());
    out
}

/// Text shown after the options in `--help`.
pub fn help_footer() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available services:");
    for service in Service::ALL {
        let _ = writeln!(out, "  • {service}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Examples:");
    let _ = writeln!(out, "  Update Komga to the latest version:");
    let _ = writeln!(out, "    $ sudo {BIN} --service komga");
    let _ = writeln!(out);
    let _ = writeln!(out, "  Update Immich with a custom configuration file:");
    let _ = writeln!(out, "    $ sudo {BIN} --service immich --config ./media-updater.toml");
    let _ = writeln!(out);
    let _ = writeln!(out, "  Show version info and the active configuration:");
    let _ = write!(out, "    $ {BIN} --version");
    out
}
