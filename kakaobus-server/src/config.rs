//! Server configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `KAKAOBUS_BIND` | `127.0.0.1:3000` |
//! | `KAKAOBUS_STORE` | `config_entries.json` |
//! | `KAKAOBUS_BASE_URL` | `https://map.kakao.com` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::kakao::{DEFAULT_BASE_URL, KakaoConfig};

pub const ENV_BIND: &str = "KAKAOBUS_BIND";
pub const ENV_STORE: &str = "KAKAOBUS_STORE";
pub const ENV_BASE_URL: &str = "KAKAOBUS_BASE_URL";

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);
const DEFAULT_STORE_PATH: &str = "config_entries.json";

/// Errors reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Configuration for the server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Path of the persisted config entries
    pub store_path: PathBuf,
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(DEFAULT_BIND),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`; unset variables keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BIND) {
            let bind = value.trim().parse().map_err(|_| ConfigError::InvalidBind {
                var: ENV_BIND,
                value: value.clone(),
            })?;
            config = config.with_bind(bind);
        }

        if let Some(value) = lookup(ENV_STORE) {
            config = config.with_store_path(non_empty(ENV_STORE, value)?);
        }

        if let Some(value) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(non_empty(ENV_BASE_URL, value)?);
        }

        Ok(config)
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Upstream client configuration.
    pub fn kakao(&self) -> KakaoConfig {
        KakaoConfig::default().with_base_url(&self.base_url)
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { var });
    }
    Ok(trimmed.to_string())
}
