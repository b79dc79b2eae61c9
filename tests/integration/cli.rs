//! Exit codes and output of the `media-updater` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn media_updater() -> Command {
    let mut cmd = Command::cargo_bin("media-updater").unwrap();
    cmd.env_remove("MEDIA_UPDATER_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_zero() {
    media_updater()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available services"))
        .stdout(predicate::str::contains("jellyfin"))
        .stdout(predicate::str::contains("--service"));
}

#[test]
fn test_version_prints_banner_and_configuration() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[immich]\ncompose_dir = \"/srv/immich\"\n").unwrap();

    media_updater()
        .arg("-v")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Media Server Service Updater"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("Directory:    /srv/immich"))
        .stdout(predicate::str::contains("Service File: /etc/systemd/system/komga.service"));
}

#[test]
fn test_config_path_from_environment() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[jellyfin]\npackage = \"jellyfin-server\"\n").unwrap();

    media_updater()
        .env("MEDIA_UPDATER_CONFIG", &config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Package:      jellyfin-server"));
}

#[test]
fn test_invalid_service_exits_one() {
    media_updater()
        .args(["--service", "plex"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("invalid value 'plex'"));
}

#[test]
fn test_missing_service_exits_one() {
    media_updater()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--service"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    media_updater()
        .args(["--service", "komga", "--verbose", "--quiet"])
        .assert()
        .code(1);
}

#[test]
fn test_version_with_missing_config_shows_defaults() {
    let temp = TempDir::new().unwrap();

    media_updater()
        .arg("--version")
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Jellyfin"))
        .stderr(predicate::str::contains("Warning"))
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_version_with_invalid_config_shows_defaults() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[komga\nservice_file = 3\n").unwrap();

    media_updater()
        .arg("--version")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid configuration file"));
}

#[test]
fn test_unprivileged_run_asks_for_sudo() {
    if media_updater::utils::is_root() {
        // Running as root would perform a real update.
        return;
    }

    media_updater()
        .args(["--service", "komga"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requires root privileges"))
        .stderr(predicate::str::contains("sudo media-updater --service <name>"));
}
