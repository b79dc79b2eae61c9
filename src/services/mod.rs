//! Update procedures for the supported media servers.
//!
//! | Service    | Mechanism                                   |
//! |------------|---------------------------------------------|
//! | `komga`    | jar artifact started by a systemd unit      |
//! | `immich`   | `docker compose` stack                      |
//! | `jellyfin` | apt package                                 |

pub mod immich;
pub mod jellyfin;
pub mod komga;

use crate::config::UpdaterConfig;
use anyhow::Result;
use clap::ValueEnum;
use std::fmt;

/// A service this tool knows how to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Service {
    /// Comic and book server (jar artifact + systemd)
    Komga,
    /// Photo management stack (docker compose)
    Immich,
    /// Media streaming server (apt package)
    Jellyfin,
}

impl Service {
    /// Every supported service, in display order.
    pub const ALL: [Self; 3] = [Self::Komga, Self::Immich, Self::Jellyfin];

    /// Selector used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Komga => "komga",
            Self::Immich => "immich",
            Self::Jellyfin => "jellyfin",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Update `service` using the settings in `config`.
pub async fn update(service: Service, config: &UpdaterConfig) -> Result<()> {
    match service {
        Service::Komga => komga::update(&config.komga, &config.network).await,
        Service::Immich => immich::update(&config.immich).await,
        Service::Jellyfin => jellyfin::update(&config.jellyfin).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_value_enum() {
        for service in Service::ALL {
            let parsed = Service::from_str(service.name(), false).unwrap();
            assert_eq!(parsed, service);
            assert_eq!(service.to_string(), service.name());
        }
        assert!(Service::from_str("plex", false).is_err());
    }
}
