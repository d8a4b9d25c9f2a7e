//! Server configuration
//!
//! Loaded from TOML, then overridden by `RETROPIE_*` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheTtls;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("{0} must be set (config file or RETROPIE_{1})")]
    Missing(&'static str, &'static str),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetroConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cache: CacheTtls,
}

/// How to reach the managed host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Identity file passed to ssh with `-i`
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Upper bound on a single remote command, connection included
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    #[serde(default = "default_ssh_binary")]
    pub ssh_binary: String,
}

fn default_username() -> String {
    "pi".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_command_timeout() -> u64 {
    30
}

fn default_ssh_binary() -> String {
    "ssh".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: default_username(),
            port: default_port(),
            key_path: None,
            connect_timeout_secs: default_connect_timeout(),
            command_timeout_secs: default_command_timeout(),
            ssh_binary: default_ssh_binary(),
        }
    }
}

/// Directories on the managed host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Defaults to `/home/<username>`
    #[serde(default)]
    pub home_dir: Option<String>,
    /// Defaults to `<home_dir>/RetroPie/BIOS`
    #[serde(default)]
    pub bios_dir: Option<String>,
}

impl RetroConfig {
    /// Load from the first config file found, then apply the environment
    ///
    /// Search order: `RETRO_CONFIG_PATH`, `./retro-mcp.toml`,
    /// `$XDG_CONFIG_HOME/retro-mcp/config.toml`. With no file the defaults
    /// are used.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                let config = Self::from_file(&path)?;
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_from(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var("RETRO_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!("RETRO_CONFIG_PATH={} does not exist", env_path);
        }

        let mut config_paths = vec![PathBuf::from("retro-mcp.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("retro-mcp").join("config.toml"));
        }
        config_paths.into_iter().find(|path| path.exists())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `RETROPIE_HOST`, `RETROPIE_USERNAME`, `RETROPIE_PORT` and
    /// `RETROPIE_KEY_PATH` as resolved by `lookup`
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RETROPIE_HOST") {
            self.connection.host = host;
        }
        if let Some(username) = lookup("RETROPIE_USERNAME") {
            self.connection.username = username;
        }
        if let Some(port) = lookup("RETROPIE_PORT") {
            self.connection.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "RETROPIE_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(key_path) = lookup("RETROPIE_KEY_PATH") {
            self.connection.key_path = Some(PathBuf::from(key_path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::Missing("connection.host", "HOST"));
        }
        if self.connection.username.trim().is_empty() {
            return Err(ConfigError::Missing("connection.username", "USERNAME"));
        }
        Ok(())
    }

    pub fn home_dir(&self) -> String {
        self.paths
            .home_dir
            .clone()
            .unwrap_or_else(|| format!("/home/{}", self.connection.username))
    }

    pub fn bios_dir(&self) -> String {
        self.paths
            .bios_dir
            .clone()
            .unwrap_or_else(|| format!("{}/RetroPie/BIOS", self.home_dir()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RetroConfig::default();
        assert_eq!(config.connection.port, 22);
        assert_eq!(config.connection.username, "pi");
        assert_eq!(config.connection.connect_timeout_secs, 10);
        assert_eq!(config.connection.command_timeout_secs, 30);
        assert_eq!(config.cache.system_info, 30);
        assert_eq!(config.bios_dir(), "/home/pi/RetroPie/BIOS");
    }

    #[test]
    fn test_partial_toml() {
        let config = RetroConfig::from_toml(
            r#"
[connection]
host = "retropie.local"
username = "retro"

[cache]
system_info = 5
"#,
        )
        .unwrap();
        assert_eq!(config.connection.host, "retropie.local");
        assert_eq!(config.connection.port, 22);
        assert_eq!(config.cache.system_info, 5);
        assert_eq!(config.cache.hardware_scan, 300);
        assert_eq!(config.bios_dir(), "/home/retro/RetroPie/BIOS");
    }

    #[test]
    fn test_explicit_paths() {
        let config = RetroConfig::from_toml(
            r#"
[paths]
home_dir = "/opt/retro"
"#,
        )
        .unwrap();
        assert_eq!(config.bios_dir(), "/opt/retro/RetroPie/BIOS");

        let config = RetroConfig::from_toml("[paths]\nbios_dir = \"/mnt/bios\"\n").unwrap();
        assert_eq!(config.bios_dir(), "/mnt/bios");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RetroConfig::default();
        config
            .apply_env_from(env(&[
                ("RETROPIE_HOST", "192.168.1.20"),
                ("RETROPIE_USERNAME", "retro"),
                ("RETROPIE_PORT", "2222"),
                ("RETROPIE_KEY_PATH", "/home/me/.ssh/retro"),
            ]))
            .unwrap();

        assert_eq!(config.connection.host, "192.168.1.20");
        assert_eq!(config.connection.username, "retro");
        assert_eq!(config.connection.port, 2222);
        assert_eq!(
            config.connection.key_path,
            Some(PathBuf::from("/home/me/.ssh/retro"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_port() {
        let mut config = RetroConfig::default();
        let err = config
            .apply_env_from(env(&[("RETROPIE_PORT", "ssh")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "RETROPIE_PORT", .. }));
    }

    #[test]
    fn test_validation() {
        let config = RetroConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("connection.host", _))
        ));

        let mut config = RetroConfig::default();
        config.connection.host = "retropie".to_string();
        config.connection.username = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = RetroConfig::from_file(Path::new("/nonexistent/retro-mcp.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
