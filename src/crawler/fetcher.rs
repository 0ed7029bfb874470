//! HTTP fetcher implementation
//!
//! This module retrieves listing pages by index. It deliberately does no
//! retrying: any failure is reported to the orchestrator, which aborts the
//! whole crawl.

use crate::config::SourceConfig;
use crate::url::page_url;
use crate::{CatalogError, FetchError};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The listing site configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves raw listing pages from the source site
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: String,
}

impl PageFetcher {
    /// Creates a fetcher for the configured site
    pub fn new(config: &SourceConfig) -> Result<Self, CatalogError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The site root every page and link is resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the URL for a 1-based page index
    pub fn url_for(&self, page: u32) -> Result<Url, CatalogError> {
        Ok(page_url(&self.base_url, page)?)
    }

    /// Fetches the raw document for a page
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Request timed out | `FetchError::Timeout` |
    /// | Connection or protocol failure | `FetchError::Network` |
    /// | Non-2xx status | `FetchError::Status` |
    /// | Body could not be read | `FetchError::Body` |
    pub async fn fetch_page(&self, page: u32) -> Result<String, CatalogError> {
        let url = self.url_for(page)?;
        Ok(fetch_document(&self.client, url.as_str()).await?)
    }
}

/// Fetches a URL and returns its body, classifying failures
pub async fn fetch_document(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        }
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}
