use std::time::Duration;

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Blocking HTTP client for remote BED downloads
pub struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("region-index/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Download `url` in full; non-2xx responses are errors
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` on connection failure or error status.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        info!("Fetching {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}
