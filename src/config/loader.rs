//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Table;

use crate::config::env::{overlay, read_dotenv};
use crate::config::schema::AppConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Deserialize(#[source] toml::de::Error),
}

/// Builds an [`AppConfig`] from an optional TOML file, an optional `.env`
/// file and environment variables.
///
/// Precedence, lowest first: file, process environment, `.env`.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    dotenv: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base TOML file. Must exist when set.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// `.env` file. A missing file is ignored.
    pub fn dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Explicit variables, in place of or in addition to the process environment.
    pub fn env_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env_vars.extend(vars);
        self
    }

    /// Take variables from the process environment.
    pub fn process_env(self) -> Self {
        self.env_vars(env::vars())
    }

    pub fn load(self) -> Result<AppConfig, ConfigError> {
        let mut table = match &self.file {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str::<Table>(&content).map_err(ConfigError::Parse)?
            }
            None => Table::new(),
        };

        overlay(&mut table, self.env_vars);

        if let Some(path) = &self.dotenv {
            let vars = read_dotenv(path).map_err(|source| ConfigError::Dotenv {
                path: path.clone(),
                source,
            })?;
            overlay(&mut table, vars);
        }

        let config: AppConfig = toml::Value::Table(table)
            .try_into()
            .map_err(ConfigError::Deserialize)?;

        tracing::debug!(
            file = ?self.file,
            routes = config.routes.len(),
            cyclic_jobs = config.cyclic_jobs.len(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Load a TOML file overlaid with `./.env` and the process environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    ConfigLoader::new()
        .file(path)
        .process_env()
        .dotenv(".env")
        .load()
}
