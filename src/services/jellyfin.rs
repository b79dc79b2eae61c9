//! Jellyfin: upgrade the distribution package.

use crate::config::JellyfinConfig;
use crate::process::SystemCommand;
use anyhow::{Context, Result};
use colored::Colorize;

/// Refresh package lists, then upgrade the package if it is installed.
pub async fn update(config: &JellyfinConfig) -> Result<()> {
    println!("{}", "Updating package list...".cyan());
    refresh_command().execute_success().await.context("Failed to update package list")?;

    println!("{} {}...", "Upgrading package".cyan(), config.package.bold());
    upgrade_command(config)
        .execute_success()
        .await
        .with_context(|| format!("Failed to upgrade package {}", config.package))?;

    println!("{}", "Jellyfin updated successfully.".green());
    Ok(())
}

fn refresh_command() -> SystemCommand {
    SystemCommand::new("apt").arg("update").with_context("jellyfin")
}

fn upgrade_command(config: &JellyfinConfig) -> SystemCommand {
    SystemCommand::new("apt")
        .args(["install", "--only-upgrade", "-y"])
        .arg(config.package.as_str())
        .with_context("jellyfin")
}
