//! HTTP transport behind a trait so tests can count round trips without a
//! network.

use std::time::Duration;

use async_trait::async_trait;

/// User-Agent sent with every archive request.
const USER_AGENT: &str = concat!("mobility-map/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Connection, timeout, or body read failure. The URL is stripped so
    /// the access token never reaches an error message.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status}")]
    Status {
        /// Status code returned by the server.
        status: u16,
    },
}

/// Retrieves raw bytes from a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET and returns the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] on transport failure or a non-success
    /// status.
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, NetworkError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with its own client.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Http`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(reqwest::Error::without_url)?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, NetworkError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(body.to_vec())
    }
}
