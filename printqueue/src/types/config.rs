//! Process configuration read once at startup

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use super::Environment;
use crate::middleware::AccessTokens;

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 8080;

/// Directory holding the built web UI when `STATIC_DIR` is not set
pub const DEFAULT_STATIC_DIR: &str = "./js/build";

/// Errors that prevent the service from starting
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("env var {0} must be set")]
    Missing(&'static str),

    /// `PORT` is not a valid port number
    #[error("invalid PORT {value:?}: {source}")]
    InvalidPort {
        /// Raw value of the variable
        value: String,
        /// Parse failure
        source: ParseIntError,
    },

    /// `APP_ENV` names an unknown environment
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment stage
    pub environment: Environment,
    /// Port the HTTP server binds on all interfaces
    pub port: u16,
    /// Shared secrets for the upload and download gates
    pub access_tokens: AccessTokens,
    /// Directory served for the web UI
    pub static_dir: PathBuf,
    /// Object store endpoint overriding the environment default
    pub storage_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `UPTOKEN` or `DOWNTOKEN` is unset,
    /// `ConfigError::InvalidPort` if `PORT` does not parse, and
    /// `ConfigError::InvalidEnvironment` for an unknown `APP_ENV`
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;

        let port = optional("PORT").map_or(Ok(DEFAULT_PORT), |value| {
            value
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })
        })?;

        let access_tokens = AccessTokens::new(required("UPTOKEN")?, required("DOWNTOKEN")?);

        Ok(Self {
            environment,
            port,
            access_tokens,
            static_dir: optional("STATIC_DIR").map_or_else(|| DEFAULT_STATIC_DIR.into(), PathBuf::from),
            storage_endpoint: optional("S3_ENDPOINT_URL"),
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}
