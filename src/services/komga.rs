//! Komga: switch the systemd unit to the newest jar.

use crate::artifact::ArtifactPattern;
use crate::config::{KomgaConfig, NetworkConfig};
use crate::release::{
    Downloader, GitHubReleaseFeed, HttpDownloader, ReleaseFeed, ReleaseResolver, ReleaseStrategy,
};
use crate::service::{ServiceManager, Systemctl};
use crate::update::{ArtifactUpdater, PruneResult, UpdateOutcome};
use anyhow::Result;
use colored::Colorize;

/// Update Komga with the configured release strategy and systemd.
pub async fn update(config: &KomgaConfig, network: &NetworkConfig) -> Result<()> {
    let pattern = ArtifactPattern::new(&config.artifact_prefix, &config.artifact_extension)?;

    match config.strategy {
        ReleaseStrategy::Remote => {
            println!("{}", format!("Checking for updates from {}...", config.repository).cyan());
            let resolver = ReleaseResolver::remote(
                &config.artifact_dir,
                pattern.clone(),
                GitHubReleaseFeed::new(&config.repository, network)?,
                HttpDownloader::new(network)?,
            );
            run(&ArtifactUpdater::new(&config.service_file, pattern, resolver, Systemctl)).await?;
        }
        ReleaseStrategy::Local => {
            println!(
                "{}",
                format!("Looking for new artifacts in {}...", config.artifact_dir.display()).cyan()
            );
            let resolver = ReleaseResolver::local(&config.artifact_dir, pattern.clone());
            run(&ArtifactUpdater::new(&config.service_file, pattern, resolver, Systemctl)).await?;
        }
    }
    Ok(())
}

/// Run `updater` and print a summary of the outcome.
pub async fn run<F, D, S>(updater: &ArtifactUpdater<F, D, S>) -> Result<UpdateOutcome>
where
    F: ReleaseFeed,
    D: Downloader,
    S: ServiceManager,
{
    let outcome = updater.run().await?;
    for line in summary(&outcome) {
        println!("{line}");
    }
    Ok(outcome)
}

/// Human-readable lines describing `outcome`.
pub fn summary(outcome: &UpdateOutcome) -> Vec<String> {
    match outcome {
        UpdateOutcome::NoUpdateNeeded {
            current,
            latest,
        } => vec![
            format!("Current version in service: {}", current.to_string().bold()),
            format!("Latest available version:   {}", latest.to_string().bold()),
            "Service already using the latest version. No update needed.".green().to_string(),
        ],
        UpdateOutcome::Updated {
            previous,
            current,
            active,
            pruned,
        } => {
            let mut lines = vec![
                format!("Previous version: {}", previous.to_string().bold()),
                format!(
                    "{} {} ({})",
                    "Service updated and restarted with version".green(),
                    current.to_string().green().bold(),
                    active.display()
                ),
            ];
            lines.push(match pruned {
                PruneResult::Deleted(0) => "No stale artifacts to delete".to_string(),
                PruneResult::Deleted(count) => format!("Deleted {count} stale artifact(s)"),
                PruneResult::Failed(reason) => {
                    format!("{} failed to delete stale artifacts: {}", "Warning:".yellow(), reason)
                }
            });
            lines
        }
    }
}
