//! HTTP client seam shared by the search index and model clients
//!
//! Failures are classified so callers can apply the retry policy: one
//! retry with backoff for transient failures (transport errors and 5xx),
//! nothing for auth, quota, or other 4xx responses.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Transport-level errors with enough detail to classify transience
#[derive(Debug, Clone, Error)]
pub enum HttpClientError {
    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl HttpClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Transport failures and 5xx responses. 401/403 (auth) and 429
    /// (quota) are terminal: retrying them unmodified cannot succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode { .. } => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpClientError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpClientError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| HttpClientError::transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(HttpClientError::status(status, error_body));
        }

        response
            .json()
            .await
            .map_err(|e| HttpClientError::decode(e.to_string()))
    }
}

/// Backoff before the single retry of a transient failure
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(backoff: Duration) -> Self {
        Self { backoff }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_millis(200),
        }
    }
}

/// Post once, retrying a single time after backoff when the first
/// failure is transient.
pub async fn send_with_retry<C>(
    client: &C,
    url: &str,
    headers: &[(&str, &str)],
    body: &serde_json::Value,
    policy: &RetryPolicy,
) -> Result<serde_json::Value, HttpClientError>
where
    C: HttpClientTrait + ?Sized,
{
    match client.post_json(url, headers.to_vec(), body).await {
        Err(error) if error.is_transient() => {
            warn!(
                "Transient HTTP failure, retrying after {:?}: {}",
                policy.backoff, error
            );
            tokio::time::sleep(policy.backoff).await;
            client.post_json(url, headers.to_vec(), body).await
        }
        result => result,
    }
}
