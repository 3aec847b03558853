//! KakaoMap client error types.

/// Errors from the KakaoMap HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum KakaoError {
    /// HTTP request failed (connection refused, reset, DNS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the deadline
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the JSON we expect
    #[error("JSON parse error: {message}{}", fmt_body(.body))]
    Json {
        message: String,
        body: Option<String>,
    },
}

fn fmt_body(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}
