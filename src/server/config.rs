use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_MODEL_PATH: &str = "salary_model_final.json";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const ENV_LISTEN_ADDRESS: &str = "SALARY_LISTEN_ADDRESS";
pub const ENV_MODEL_PATH: &str = "SALARY_MODEL_PATH";
pub const ENV_LOG_DIR: &str = "SALARY_LOG_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Values as written in the TOML file; anything missing falls back to the
/// environment and then to the defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub listen_address: Option<String>,
    pub model_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen_address: SocketAddr,
    pub model_path: PathBuf,
    pub log_dir: PathBuf,
}

impl ServerConfig {
    /// Reads the optional config file, then applies environment overrides.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => Some(Self::read_file(Path::new(path))?),
            None => None,
        };
        Self::resolve(file, |key| env::var(key).ok())
    }

    pub fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&contents)?;
        info!(path = %path.display(), "Loaded config file.");
        Ok(file)
    }

    pub fn resolve(
        file: Option<FileConfig>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let listen_address = lookup(ENV_LISTEN_ADDRESS)
            .or(file.listen_address)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string());
        let listen_address: SocketAddr = listen_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(listen_address.clone()))?;

        let model_path = lookup(ENV_MODEL_PATH)
            .map(PathBuf::from)
            .or(file.model_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let log_dir = lookup(ENV_LOG_DIR)
            .map(PathBuf::from)
            .or(file.log_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        Ok(ServerConfig {
            listen_address,
            model_path,
            log_dir,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}
