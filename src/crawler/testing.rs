//! In-memory fetcher for unit tests

use crate::crawler::fetcher::{DocumentFetcher, FetchedPage};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Serves canned pages and records every requested URL
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    failures: HashMap<String, u16>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn fail(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(status) = self.failures.get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            });
        }

        let target = self.redirects.get(url).map(String::as_str).unwrap_or(url);
        let body = self.pages.get(target).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;

        let final_url = Url::parse(target).map_err(|_| FetchError::InvalidUrl(target.to_string()))?;
        FetchedPage::new(final_url, body.clone())
    }
}
