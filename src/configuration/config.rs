use super::types::StorageBackend;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::info;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Application configuration structure that defines all runtime parameters.
///
/// Values come either from the command line (every flag also has an
/// environment variable) or, when `--config-file` is given, from a TOML file
/// that replaces the flags entirely.
///
/// # Examples
///
/// ```no_run
/// use sessionshelf::configuration::config::Config;
///
/// let config = Config::load().expect("bad configuration");
/// println!("Binding to: {}:{}", config.bind_address, config.port);
/// ```
///
/// # Fields Overview
///
/// - `bind_address` / `port`: where the HTTP server listens
/// - `storage_backend`: `memory` or `database`
/// - `database_url`: SeaORM connection URL, required by the `database` backend
/// - `image_dir` / `image_base_url`: where uploaded images are written and
///   the public URL prefix they are served under; uploads are disabled
///   without `image_dir`
/// - `pubsub_topic` / `pubsub_endpoint`: topic for update notifications and
///   an optional webhook to deliver them to; with a topic and no endpoint
///   messages stay in-process
#[derive(Parser, Deserialize, Debug, Clone, PartialEq)]
#[command(name = "sessionshelf")]
#[command(version)]
#[command(about = "Session catalogue web service")]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// TOML file to read the configuration from instead of the flags
    #[arg(long, env = "SESSIONSHELF_CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// IP address the HTTP server binds to
    #[arg(long, env = "SESSIONSHELF_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// TCP port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Session store implementation
    #[arg(long, env = "SESSIONSHELF_STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Memory)]
    pub storage_backend: StorageBackend,

    /// Database connection URL, e.g. `sqlite://sessionshelf.sqlite3?mode=rwc`
    #[arg(long, env = "SESSIONSHELF_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory uploaded images are written to
    #[arg(long, env = "SESSIONSHELF_IMAGE_DIR")]
    pub image_dir: Option<PathBuf>,

    /// Public URL prefix of uploaded images
    #[arg(long, env = "SESSIONSHELF_IMAGE_BASE_URL", default_value = "/images")]
    pub image_base_url: String,

    /// Topic that session updates are announced on
    #[arg(long, env = "SESSIONSHELF_PUBSUB_TOPIC")]
    pub pubsub_topic: Option<String>,

    /// Webhook URL that announcements are POSTed to
    #[arg(long, env = "SESSIONSHELF_PUBSUB_ENDPOINT")]
    pub pubsub_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: None,
            bind_address: "0.0.0.0".into(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            database_url: None,
            image_dir: None,
            image_base_url: "/images".into(),
            pubsub_topic: None,
            pubsub_endpoint: None,
        }
    }
}

impl Config {
    /// Parses the process arguments, follows `--config-file` if present and
    /// validates the result.
    ///
    /// # Panics
    /// Exits the process with clap's usage message when the arguments cannot
    /// be parsed, and on `--help` / `--version`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(Config::parse())
    }

    /// Like [`Config::load`] but over an explicit argument list and without
    /// exiting on parse errors.
    pub fn load_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let parsed = Config::try_parse_from(args).map_err(|e| ConfigError::ArgsError(e.to_string()))?;
        Self::resolve(parsed)
    }

    fn resolve(parsed: Config) -> Result<Self, ConfigError> {
        let config = match parsed.config_file {
            Some(ref path) => Self::from_file(path)?,
            None => parsed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_file = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.storage_backend == StorageBackend::Database
            && self.database_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingValue(
                "database_url is required by the database storage backend".into(),
            ));
        }
        if let Some(ref topic) = self.pubsub_topic {
            if topic.trim().is_empty() {
                return Err(ConfigError::InvalidValue("pubsub_topic is empty".into()));
            }
        }
        if self.pubsub_endpoint.is_some() && self.pubsub_topic.is_none() {
            return Err(ConfigError::MissingValue(
                "pubsub_endpoint is set but pubsub_topic is not".into(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            ConfigError::InvalidValue(format!("bind_address {:?} is not an IP address", self.bind_address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
