//! KakaoMap bus HTTP client.
//!
//! One request per call, no retries: callers decide when to try again.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::trace;

use crate::domain::StopId;

use super::error::KakaoError;
use super::types::StopResponse;

/// Default base URL for the KakaoMap API.
pub const DEFAULT_BASE_URL: &str = "https://map.kakao.com";

/// Default request deadline in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The endpoint rejects requests without a browser-like user agent.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Response bodies quoted in errors are cut to this many characters.
const ERROR_BODY_CHARS: usize = 500;

/// Configuration for the KakaoMap client.
#[derive(Debug, Clone)]
pub struct KakaoConfig {
    /// Base URL for the API (defaults to production KakaoMap)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl KakaoConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// KakaoMap bus stop client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct KakaoClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl KakaoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: KakaoConfig) -> Result<Self, KakaoError> {
        let mut headers = HeaderMap::new();

        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|_| KakaoError::Api {
                status: 0,
                message: "Invalid user agent format".to_string(),
            })?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Fetch the arrival board for a stop.
    ///
    /// Fails on transport errors, timeouts, non-success status codes and
    /// bodies that are not a JSON object of the expected shape. A response
    /// without `lines` is not an error here; callers decide what it means.
    pub async fn fetch_stop(&self, stop_id: &StopId) -> Result<StopResponse, KakaoError> {
        let url = format!("{}/bus/stop.json", self.base_url);

        trace!(stop_id = %stop_id, "Fetching stop");

        let response = self
            .http
            .get(&url)
            .query(&[("busstopid", stop_id.as_str())])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KakaoError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        serde_json::from_str(&body).map_err(|e| KakaoError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(ERROR_BODY_CHARS).collect()),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport_error(&self, err: reqwest::Error) -> KakaoError {
        if err.is_timeout() {
            KakaoError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            KakaoError::Http(err)
        }
    }
}
