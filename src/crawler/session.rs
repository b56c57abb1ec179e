//! Per-walk fetch session
//!
//! A session owns the fetcher and the last observed origin. Each fetch
//! records where the site was actually served from, so relative links keep
//! resolving correctly after the seed forwards to a new mirror.

use crate::crawler::fetcher::{DocumentFetcher, FetchedPage};
use crate::url::{is_absolute, Origin};
use crate::{FetchError, Result};
use std::sync::{Arc, RwLock};

/// Fetch context shared by every level of one walker
pub struct Session {
    fetcher: Arc<dyn DocumentFetcher>,
    seed_url: String,
    origin: RwLock<Option<Origin>>,
}

impl Session {
    /// Creates a session that has not yet observed any origin
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, seed_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            seed_url: seed_url.into(),
            origin: RwLock::new(None),
        }
    }

    /// The configured entry point
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    /// The origin of the most recently served page, if any
    pub fn origin(&self) -> Option<Origin> {
        self.origin
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Fetches a page and records the origin it was served from
    ///
    /// Bare references (such as `/amaran/` handed in by an API caller) are
    /// resolved first, see [`Session::resolve`].
    pub async fn fetch(&self, reference: &str) -> Result<FetchedPage> {
        let url = self.resolve(reference).await?;
        Ok(self.fetch_absolute(&url).await?)
    }

    async fn fetch_absolute(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        let page = self.fetcher.fetch(url).await?;
        self.observe(&page.origin);
        Ok(page)
    }

    /// Resolves a reference to an absolute URL against the current origin
    ///
    /// When nothing has been fetched yet the seed is fetched first so the
    /// join happens against wherever the seed actually redirects.
    pub async fn resolve(&self, reference: &str) -> Result<String> {
        if is_absolute(reference.trim()) {
            return Ok(reference.trim().to_string());
        }

        let origin = match self.origin() {
            Some(origin) => origin,
            None => {
                tracing::debug!("No origin known yet, fetching seed {}", self.seed_url);
                self.fetch_absolute(&self.seed_url).await?.origin
            }
        };

        Ok(origin.resolve(reference)?)
    }

    fn observe(&self, served: &Origin) {
        let mut current = self
            .origin
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if current.as_ref() != Some(served) {
            match current.as_ref() {
                Some(previous) => tracing::info!("Origin drifted: {} -> {}", previous, served),
                None => tracing::debug!("Origin resolved to {}", served),
            }
            *current = Some(served.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::StaticFetcher;

    #[tokio::test]
    async fn test_resolve_absolute_without_fetching() {
        let fetcher = Arc::new(StaticFetcher::new());
        let session = Session::new(fetcher.clone(), "https://seed.example/");

        let link = session.resolve("https://cdn.example/a.mp4").await.unwrap();
        assert_eq!(link, "https://cdn.example/a.mp4");
        assert_eq!(fetcher.request_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_relative_fetches_seed_first() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .redirect("https://seed.example/", "https://mirror.example/home")
                .page("https://mirror.example/home", "<html></html>"),
        );
        let session = Session::new(fetcher.clone(), "https://seed.example/");

        let link = session.resolve("/tamil-2025-movies/").await.unwrap();
        assert_eq!(link, "https://mirror.example/tamil-2025-movies/");
        assert_eq!(fetcher.request_count(), 1);

        // Origin is now known; no further seed fetch
        let link = session.resolve("movie/").await.unwrap();
        assert_eq!(link, "https://mirror.example/movie/");
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_tracks_origin_drift() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page("https://one.example/a", "<html></html>")
                .redirect("https://one.example/b", "https://two.example/b")
                .page("https://two.example/b", "<html></html>"),
        );
        let session = Session::new(fetcher, "https://one.example/a");

        session.fetch("https://one.example/a").await.unwrap();
        assert_eq!(session.origin().unwrap().to_string(), "https://one.example");

        session.fetch("https://one.example/b").await.unwrap();
        assert_eq!(session.origin().unwrap().to_string(), "https://two.example");
    }

    #[tokio::test]
    async fn test_fetch_resolves_bare_reference_through_seed() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .redirect("https://seed.example/", "https://mirror.example/")
                .page("https://mirror.example/", "<html></html>")
                .page("https://mirror.example/amaran/", "<p>Amaran</p>"),
        );
        let session = Session::new(fetcher.clone(), "https://seed.example/");

        let page = session.fetch("/amaran/").await.unwrap();
        assert_eq!(page.url.as_str(), "https://mirror.example/amaran/");
        assert_eq!(fetcher.count_for("https://seed.example/"), 1);

        // The mirror origin is reused for the next bare reference
        session.fetch("/amaran/").await.unwrap();
        assert_eq!(fetcher.count_for("https://seed.example/"), 1);
        assert_eq!(fetcher.count_for("https://mirror.example/amaran/"), 2);
    }

    #[tokio::test]
    async fn test_seed_failure_surfaces_as_fetch_error() {
        let session = Session::new(Arc::new(StaticFetcher::new()), "https://seed.example/");
        let result = session.resolve("/x").await;
        assert!(matches!(result, Err(crate::StrataError::Fetch(_))));
    }
}
