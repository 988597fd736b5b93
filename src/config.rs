//! Config loading and schema.
//!
//! One toml file, defaulted section by section. A missing or broken file
//! falls back to defaults with a logged warning.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback server port when the hostname carries none, or an unparsable
/// one.
const DEFAULT_DB_PORT: u16 = 3306;

const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 300;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_CODE_LEN: usize = 6;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub linking: LinkingConfig,
}

/// Backing-store settings.
///
/// The sqlite backend only needs `path`. The network fields describe the
/// server a remote backend would dial; they ride along in the same section
/// so one file covers either deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding the sqlite database file.
    pub path: PathBuf,
    /// Remote server address, `host` or `host:port`.
    pub hostname: String,
    /// Database (schema) name on the remote server.
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
            hostname: "localhost".to_string(),
            database: "playerlink".to_string(),
            username: "playerlink".to_string(),
            password: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Split `hostname` into host and port.
    ///
    /// A missing port, or one that does not parse, falls back to 3306 with
    /// a logged warning.
    pub fn address(&self) -> (&str, u16) {
        match self.hostname.split_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host, port),
                Err(_) => {
                    tracing::warn!(port, "not a valid port, using the default");
                    (host, DEFAULT_DB_PORT)
                }
            },
            None => (self.hostname.as_str(), DEFAULT_DB_PORT),
        }
    }
}

/// Link-request handshake settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Seconds a pending request stays verifiable.
    pub verify_timeout_secs: u64,
    /// Seconds between janitor sweeps of expired requests.
    pub sweep_interval_secs: u64,
    /// Generated link-code length.
    pub code_len: usize,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            verify_timeout_secs: DEFAULT_VERIFY_TIMEOUT_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            code_len: DEFAULT_CODE_LEN,
        }
    }
}

impl LinkingConfig {
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load `path`, defaulting (with a warning) when it is absent or broken.
pub fn load_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match load_from(path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("config load failed, using defaults: {err}");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_splits_host_and_port() {
        let config = DatabaseConfig {
            hostname: "db.example.net:3307".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(config.address(), ("db.example.net", 3307));
    }

    #[test]
    fn address_defaults_missing_port() {
        let config = DatabaseConfig {
            hostname: "db.example.net".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(config.address(), ("db.example.net", DEFAULT_DB_PORT));
    }

    #[test]
    fn address_defaults_unparsable_port() {
        let config = DatabaseConfig {
            hostname: "db.example.net:nope".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(config.address(), ("db.example.net", DEFAULT_DB_PORT));
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            [linking]
            verify_timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.linking.verify_timeout(), Duration::from_secs(60));
        assert_eq!(config.linking.code_len, DEFAULT_CODE_LEN);
        assert_eq!(config.database.hostname, "localhost");
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = load_or_default(Path::new("/nonexistent/playerlink.toml"));
        assert_eq!(
            config.linking.sweep_interval(),
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        );
    }
}
