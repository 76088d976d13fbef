//! # HTTP Feed Client
//!
//! Fetches the raw vehicle-position feed with a single GET. The body is handed
//! back untouched; parsing is someone else's job.
//!
//! Every transport problem comes back as a [`FetchError`] instead of ending the
//! process. A feed host hiccup is expected and the caller simply tries again on
//! the next tick.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

use super::FeedSource;

/// Everything that can go wrong retrieving the feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The configured feed location is not an absolute URL.
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, DNS, TLS or timeout failure (after any retries).
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The feed host answered with a non-2xx status.
    #[error("feed returned HTTP {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Error body, when the server sent a readable one.
        body: Option<String>,
    },

    /// The connection broke while reading the body.
    #[error("failed to read feed body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Settings for [`FeedClient`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Absolute URL of the plaintext feed.
    pub url: String,
    /// Upper bound for one request, connect to last body byte.
    pub timeout: Duration,
    /// Upper bound for establishing the connection.
    pub connect_timeout: Duration,
    /// Retries on transient failures within one fetch. `0` disables retrying.
    pub max_retries: u32,
    /// `User-Agent` sent to the feed host.
    pub user_agent: String,
}

impl FeedConfig {
    /// Config for `url` with a five second timeout and no retries.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(3),
            max_retries: 0,
            user_agent: concat!("bus-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Plaintext feed client.
pub struct FeedClient {
    inner: ClientWithMiddleware,
    url: Url,
}

impl FeedClient {
    /// Builds a client for `config.url`.
    ///
    /// # Errors
    /// Returns [`FetchError::InvalidUrl`] for a relative or malformed URL and
    /// [`FetchError::Client`] if the TLS backend cannot be initialised.
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let url = Url::parse(&config.url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain, */*"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            inner: builder.build(),
            url,
        })
    }

    /// The feed location this client polls.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Performs one GET and returns the whole body.
    pub async fn fetch_raw(&self) -> Result<Bytes, FetchError> {
        let response = self.inner.get(self.url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Keep whatever the server said for the logs.
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.bytes().await.map_err(FetchError::Body)
    }
}

impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<Bytes, FetchError> {
        self.fetch_raw().await
    }
}
