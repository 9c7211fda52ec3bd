//! TOML-backed process configuration.
//!
//! A missing config file is not fatal: [`Config::load_or_default`] falls back
//! to [`Config::default`] and logs at `warn`, since the registration handshake only requires a
//! password when one has actually been configured.

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{PING_IDLE_SECONDS_DEFAULT, PING_TIMEOUT_SECONDS_DEFAULT};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub motd_path: String,
    /// Shared connection password; clients must `PASS` this to register. Empty string means
    /// no password is required.
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_connections: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_channels_per_user: usize,
    pub max_message_length: usize,
    pub max_nickname_length: usize,
    pub max_channel_name_length: usize,
    pub max_topic_length: usize,
    pub ping_idle_seconds: u64,
    pub ping_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            network: NetworkConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: "irc.local".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            motd_path: "motd.txt".to_owned(),
            password: String::new(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_address: "0.0.0.0".to_owned(),
            port: 6667,
            max_connections: 1024,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_channels_per_user: 20,
            max_message_length: 512,
            max_nickname_length: 9,
            max_channel_name_length: 200,
            max_topic_length: 390,
            ping_idle_seconds: PING_IDLE_SECONDS_DEFAULT,
            ping_timeout_seconds: PING_TIMEOUT_SECONDS_DEFAULT,
        }
    }
}

impl Config {
    /// Loads and parses the TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if present, otherwise falls back to built-in defaults rather than
    /// aborting startup.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "could not load config from {}: {err}; using built-in defaults",
                    path.as_ref().display()
                );
                Config::default()
            }
        }
    }

    /// Applies CLI-supplied `<port>`/`<password>` positionals over the config file's values,
    /// per the documented CLI surface.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, password: Option<String>) {
        if let Some(port) = port {
            self.network.port = port;
        }
        if let Some(password) = password {
            self.server.password = password;
        }
    }

    pub fn requires_password(&self) -> bool {
        !self.server.password.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_no_password() {
        assert!(!Config::default().requires_password());
    }

    #[test]
    fn cli_overrides_apply_on_top_of_defaults() {
        let mut config = Config::default();
        config.apply_cli_overrides(Some(6697), Some("hunter2".to_owned()));
        assert_eq!(config.network.port, 6697);
        assert!(config.requires_password());
    }

    #[test]
    fn parses_minimal_toml_with_defaulted_fields() {
        let toml_str = r#"
            [server]
            name = "irc.test"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.name, "irc.test");
        assert_eq!(config.network.port, 6667);
        assert_eq!(config.limits.ping_idle_seconds, PING_IDLE_SECONDS_DEFAULT);
    }
}
