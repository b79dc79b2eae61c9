//! Loading and validating the top-level configuration.

use super::sections::{ImmichConfig, JellyfinConfig, KomgaConfig, NetworkConfig};
use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_LOCK_FILE};
use crate::core::UpdaterError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Everything the updater needs to know about the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UpdaterConfig {
    /// File locked for the duration of a run so updates never overlap.
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,

    /// Komga settings.
    #[serde(default)]
    pub komga: KomgaConfig,

    /// Immich settings.
    #[serde(default)]
    pub immich: ImmichConfig,

    /// Jellyfin settings.
    #[serde(default)]
    pub jellyfin: JellyfinConfig,

    /// HTTP settings for release lookups and downloads.
    #[serde(default)]
    pub network: NetworkConfig,

    /// File this configuration was read from; `None` for built-in defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            lock_file: default_lock_file(),
            komga: KomgaConfig::default(),
            immich: ImmichConfig::default(),
            jellyfin: JellyfinConfig::default(),
            network: NetworkConfig::default(),
            source: None,
        }
    }
}

fn default_lock_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOCK_FILE)
}

impl UpdaterConfig {
    /// Load configuration from `explicit`, or from the default location.
    ///
    /// An explicitly named file must exist. The default file may be absent,
    /// in which case built-in defaults are used. The result is validated.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(UpdaterError::Configuration {
                        message: format!("configuration file {} does not exist", path.display()),
                    }
                    .into());
                }
                Self::load_from(path).await?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from(path).await?
                } else {
                    debug!("No configuration file at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a specific TOML file without validating it.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| UpdaterError::file_system("read", path, &e))?;

        let mut config: Self = toml::from_str(&content).map_err(|e| {
            UpdaterError::Configuration {
                message: format!("invalid configuration file {}: {}", path.display(), e.message()),
            }
        })?;
        config.source = Some(path.to_path_buf());

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<()> {
        let komga = &self.komga;

        if komga.artifact_prefix.is_empty() || komga.artifact_extension.is_empty() {
            return Err(configuration("komga.artifact_prefix and komga.artifact_extension must not be empty"));
        }

        let mut parts = komga.repository.split('/');
        let valid_repository = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !valid_repository {
            return Err(configuration(&format!(
                "komga.repository must be in owner/name form, got '{}'",
                komga.repository
            )));
        }

        for (key, path) in [
            ("lock_file", &self.lock_file),
            ("komga.service_file", &komga.service_file),
            ("komga.artifact_dir", &komga.artifact_dir),
            ("immich.compose_dir", &self.immich.compose_dir),
        ] {
            if !path.is_absolute() {
                return Err(configuration(&format!(
                    "{key} must be an absolute path, got '{}'",
                    path.display()
                )));
            }
        }

        if self.jellyfin.package.trim().is_empty() {
            return Err(configuration("jellyfin.package must not be empty"));
        }

        Ok(())
    }

    /// Where the configuration came from, for display.
    pub fn source_description(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string())
    }
}

fn configuration(message: &str) -> anyhow::Error {
    UpdaterError::Configuration {
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::ReleaseStrategy;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = UpdaterConfig::default();
        config.validate().unwrap();
        assert_eq!(config.komga.service_file, PathBuf::from("/etc/systemd/system/komga.service"));
        assert_eq!(config.komga.strategy, ReleaseStrategy::Remote);
        assert_eq!(config.jellyfin.package, "jellyfin");
        assert_eq!(config.network.retries, 1);
        assert_eq!(config.source_description(), "built-in defaults");
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[komga]
artifact_dir = "/srv/komga"
strategy = "local"

[network]
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = UpdaterConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.komga.artifact_dir, PathBuf::from("/srv/komga"));
        assert_eq!(config.komga.strategy, ReleaseStrategy::Local);
        assert_eq!(config.komga.artifact_prefix, "komga-");
        assert_eq!(config.network.timeout_secs, 5);
        assert_eq!(config.network.download_timeout_secs, 600);
        assert_eq!(config.immich, ImmichConfig::default());
        assert_eq!(config.source, Some(path));
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = UpdaterConfig::load(Some(&temp_dir.path().join("missing.toml")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UpdaterError>(),
            Some(UpdaterError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[komga]\nservice = \"/x\"\n").unwrap();

        let err = UpdaterConfig::load(Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("invalid configuration file"));
    }

    #[test]
    fn test_validation_rules() {
        let mut config = UpdaterConfig::default();
        config.komga.repository = "gotson".to_string();
        assert!(config.validate().is_err());

        let mut config = UpdaterConfig::default();
        config.komga.artifact_dir = PathBuf::from("relative/dir");
        assert!(config.validate().unwrap_err().to_string().contains("komga.artifact_dir"));

        let mut config = UpdaterConfig::default();
        config.komga.artifact_extension = String::new();
        assert!(config.validate().is_err());
    }
}
