//! Configuration management for RAX File Server
//!
//! Values are layered: built-in defaults, then `config.toml`, then
//! `RAX_FILES__*` environment variables. Everything here is read once at
//! startup; the storage root and listening endpoint never change afterwards.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Candidate config file locations, tried in order (extension is implied).
const CONFIG_PATHS: [&str; 2] = [
    "rax-file-server/config", // Docker production: /app/rax-file-server/config.toml
    "config",                 // Local development: ./config.toml
];

const ENV_PREFIX: &str = "RAX_FILES";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the listener to
    pub bind_address: String,

    /// TCP port for incoming requests
    pub port: u16,

    /// Directory that bounds all file access
    pub storage_root: String,

    /// Maximum concurrent client connections
    pub max_clients: usize,

    /// Maximum length of a single request line in bytes
    pub max_request_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if let Some(path) = CONFIG_PATHS
            .iter()
            .find(|p| Path::new(&format!("{p}.toml")).exists())
        {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from TOML text layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 3000_i64)?
            .set_default("storage_root", "storage")?
            .set_default("max_clients", 64_i64)?
            .set_default("max_request_bytes", 1_048_576_i64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_request_bytes < 1024 {
            return Err(ConfigError::Message(
                "max_request_bytes must be at least 1024".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }
}
