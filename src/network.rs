use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::Config;

/// A fetched page: final URL after redirects, status, and body text.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

impl PageResponse {
    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors at the transport level (no HTTP response was obtained, or the
/// body could not be read).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// The HTTP seam between the fetcher/authenticator and the wire.
///
/// The real implementation is [`HttpClient`]; tests substitute scripted
/// fakes so retry and re-authentication paths can run without a server.
/// Cookie state lives behind this trait: a successful login POST must make
/// subsequent `get` calls carry the session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PageResponse, TransportError>;

    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<PageResponse, TransportError>;
}

/// HTTP client for the legacy committee site.
///
/// Follows redirects (the whole point is learning the final URL) and keeps
/// a cookie store so the authenticated session persists across requests.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout_duration: Duration,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(Config::MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            timeout_duration: Duration::from_secs(timeout_secs),
        })
    }

    async fn read_response(
        &self,
        response: reqwest::Response,
    ) -> Result<PageResponse, TransportError> {
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = timeout(self.timeout_duration, response.text())
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(PageResponse {
            status,
            final_url,
            body,
        })
    }

    fn classify_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout;
        }
        TransportError::Network(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<PageResponse, TransportError> {
        let response = timeout(self.timeout_duration, self.client.get(url).send())
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(Self::classify_error)?;

        self.read_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<PageResponse, TransportError> {
        let response = timeout(
            self.timeout_duration,
            self.client.post(url).form(fields).send(),
        )
        .await
        .map_err(|_| TransportError::Timeout)?
        .map_err(Self::classify_error)?;

        self.read_response(response).await
    }
}
