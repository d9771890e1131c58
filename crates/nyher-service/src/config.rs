//! Service configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_ADDR '{value}' is not a socket address: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `SPEC_PATH`. Requests are rejected while it is unset.
    pub spec_path: Option<PathBuf>,
    /// `RULES_PATH`. The built-in rules are used when unset.
    pub rules_path: Option<PathBuf>,
    /// `BIND_ADDR`.
    pub bind_addr: SocketAddr,
    /// `PATH_LOG`. Logs are appended to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: bind.clone(),
                source,
            })?;
        Ok(Self {
            spec_path: var("SPEC_PATH").map(PathBuf::from),
            rules_path: var("RULES_PATH").map(PathBuf::from),
            bind_addr,
            log_file: var("PATH_LOG").map(PathBuf::from),
        })
    }
}
