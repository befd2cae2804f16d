//! Configuration management.
//!
//! Settings are read from an optional TOML file and then overridden from
//! `METROTUBE_*` environment variables.

mod settings;

pub use settings::{ClientIdentity, Settings, JSON_PARSE_DEPTH_LIMIT};

use std::path::PathBuf;

/// Default configuration filename looked up under the platform config dir.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";
/// Default session filename, next to the configuration file.
pub const DEFAULT_SESSION_FILENAME: &str = "session.json";

/// Errors raised while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Platform default location of the configuration file, if a config dir exists.
///
/// `~/.config/metrotube/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("metrotube").join(DEFAULT_CONFIG_FILENAME))
}

/// Platform default location of the persisted session file.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("metrotube").join(DEFAULT_SESSION_FILENAME))
}
