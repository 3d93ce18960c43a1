//! Service configuration

use std::net::SocketAddr;

use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

use crate::model::users::User;

/// Logging output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Top level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address where to host the service
    #[serde(default = "Config::default_host")]
    pub host: SocketAddr,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,

    /// Registered users. Demo users are used when empty.
    #[serde(default)]
    pub users: Vec<User>,
}

impl Config {
    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 3000).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::users::Role;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.host, Config::default_host());
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.logging.filters.is_empty());
        assert!(config.users.is_empty());
    }

    #[test]
    fn full_config() {
        let config: Config = toml::from_str(
            r#"
            host = "0.0.0.0:8080"

            [logging]
            format = "Pretty"
            filters = ["auth_server=debug", "actix_web=warn"]

            [[users]]
            id = 1
            username = "root"
            password = "toor"
            role = "admin"
            name = "Root"
            "#,
        )
        .unwrap();

        assert_eq!(config.host, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.filters.len(), 2);
        assert_eq!(
            config.users,
            [User::new(1, "root", "toor", Role::Admin, "Root")]
        );
    }

    #[test]
    fn invalid_filter_rejected() {
        let config = toml::from_str::<Config>(
            r#"
            [logging]
            filters = ["auth_server=loud"]
            "#,
        );
        assert!(config.is_err());
    }

    #[test]
    fn unknown_role_rejected() {
        let config = toml::from_str::<Config>(
            r#"
            [[users]]
            id = 1
            username = "root"
            password = "toor"
            role = "superuser"
            name = "Root"
            "#,
        );
        assert!(config.is_err());
    }
}
