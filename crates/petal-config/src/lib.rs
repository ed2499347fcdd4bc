//! Runtime configuration for the petal server and batch client.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file by the binaries) and fall back to fixed defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "model/iris_model.json";
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";

pub const HOST_VAR: &str = "PETAL_HOST";
pub const PORT_VAR: &str = "PETAL_PORT";
pub const MODEL_PATH_VAR: &str = "PETAL_MODEL_PATH";
pub const URL_VAR: &str = "PETAL_URL";

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {var}: {value:?} is not a valid IP address")]
    InvalidHost { var: &'static str, value: String },

    #[error("Invalid {var}: {value:?} is not a valid port")]
    InvalidPort { var: &'static str, value: String },

    #[error("Invalid {var}: value is empty")]
    Empty { var: &'static str },
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.into());
        let host: IpAddr = host.trim().parse().map_err(|_| ConfigError::InvalidHost {
            var: HOST_VAR,
            value: host.clone(),
        })?;

        let port: u16 = match lookup(PORT_VAR) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let model_path = lookup(MODEL_PATH_VAR).unwrap_or_else(|| DEFAULT_MODEL_PATH.into());
        if model_path.trim().is_empty() {
            return Err(ConfigError::Empty { var: MODEL_PATH_VAR });
        }

        Ok(Self { host, port, model_path: PathBuf::from(model_path) })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Base URL of the prediction service, as used by the batch client.
pub fn service_url() -> String {
    service_url_from(|key| env::var(key).ok())
}

pub fn service_url_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(URL_VAR)
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_URL.into())
}
