//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made while walking the site:
//! - Building an HTTP client with browser-like headers
//! - Following redirects so the served origin can be observed
//! - Classifying failures into status and transport errors

use crate::config::CrawlerConfig;
use crate::url::Origin;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Errors raised while retrieving a document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Cannot fetch invalid URL '{0}'")]
    InvalidUrl(String),
}

/// A successfully retrieved HTML document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,
    /// Origin that actually served the page
    pub origin: Origin,
    /// Raw HTML body
    pub body: String,
}

impl FetchedPage {
    /// Builds a page from its final URL and body
    pub fn new(url: Url, body: String) -> Result<Self, FetchError> {
        let origin = Origin::from_url(&url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        Ok(Self { url, origin, body })
    }
}

/// Retrieves documents by absolute URL
///
/// The walker only depends on this trait, so tests can serve canned pages
/// without a network.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches `url`, following redirects; non-2xx responses are errors
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use strata::config::CrawlerConfig;
/// use strata::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from crawler settings
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        tracing::debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        if final_url.as_str() != url {
            tracing::trace!("{} redirected to {}", url, final_url);
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        FetchedPage::new(final_url, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&CrawlerConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetched_page_origin() {
        let url = Url::parse("https://mirror.example.net/tamil-2025-movies/").unwrap();
        let page = FetchedPage::new(url, String::new()).unwrap();
        assert_eq!(page.origin.to_string(), "https://mirror.example.net");
    }

    #[test]
    fn test_fetched_page_rejects_non_http() {
        let url = Url::parse("file:///tmp/page.html").unwrap();
        assert!(FetchedPage::new(url, String::new()).is_err());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_transport_error() {
        let fetcher = HttpFetcher::from_config(&CrawlerConfig::default()).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
