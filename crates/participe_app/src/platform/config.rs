use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use participe_engine::SubmitSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::logging::LoggingConfig;

pub const DEFAULT_CONFIG_FILENAME: &str = "participe.ron";
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/participe";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the form posts to.
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    pub fn submit_settings(&self) -> SubmitSettings {
        SubmitSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Where the loaded settings came from. Reported once logging is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    Defaults,
}

/// Loads the RON config at `path`; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<(AppConfig, ConfigOrigin), ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok((AppConfig::default(), ConfigOrigin::Defaults));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((config, ConfigOrigin::File))
}
