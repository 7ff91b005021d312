//! Game configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use nested_tictactoe::Player;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// File read when no `--config` is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "nested_games.toml";

/// Settings for the console front end.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// TCP port the host listens on and the peer connects to.
    #[serde(default = "default_port")]
    port: u16,

    /// Address a peer joins when none is given on the command line.
    #[serde(default = "default_host_address")]
    host_address: String,

    /// Plays every move as this player (debugging aid).
    #[serde(default)]
    force_turn: Option<Player>,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

fn default_port() -> u16 {
    7777
}

fn default_host_address() -> String {
    "127.0.0.1".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host_address: default_host_address(),
            force_turn: None,
            log_filter: default_log_filter(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if present, else
    /// the defaults.
    ///
    /// # Errors
    ///
    /// An explicit path that cannot be read, or any file that does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, port: Option<u16>, force_turn: Option<Player>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if force_turn.is_some() {
            self.force_turn = force_turn;
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = GameConfig::from_file(file.path()).unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(*config.port(), 7777);
        assert_eq!(config.host_address(), "127.0.0.1");
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_values_read_from_file() {
        let file = write_config(
            "port = 9000\nhost_address = \"10.0.0.2\"\nforce_turn = \"B\"\nlog_filter = \"debug\"\n",
        );
        let config = GameConfig::from_file(file.path()).unwrap();
        assert_eq!(*config.port(), 9000);
        assert_eq!(config.host_address(), "10.0.0.2");
        assert_eq!(*config.force_turn(), Some(Player::B));
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = write_config("port = 9000\n");
        let config = GameConfig::from_file(file.path())
            .unwrap()
            .with_overrides(Some(9100), Some(Player::A));
        assert_eq!(*config.port(), 9100);
        assert_eq!(*config.force_turn(), Some(Player::A));

        let kept = GameConfig::default().with_overrides(None, None);
        assert_eq!(kept, GameConfig::default());
    }

    #[test]
    fn test_bad_file_reports_location() {
        let file = write_config("port = \"not a number\"\n");
        let err = GameConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
        assert!(err.file.ends_with("config.rs"));

        let missing = GameConfig::from_file("/nonexistent/nested_games.toml").unwrap_err();
        assert!(missing.message.contains("Failed to read config file"));
    }
}
