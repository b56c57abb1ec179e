//! On-demand reads of the site, enriched from the index
//!
//! Every call walks the live site through this service's own walker; the
//! index only supplies search results and stored metadata.

use crate::config::Config;
use crate::crawler::Indexer;
use crate::storage::IndexDocument;
use crate::walker::{
    CategoryEntry, ListingEntry, StreamOutcome, StreamResolution, VariantEntry, Walker,
};
use crate::{Result, StrataError};
use std::sync::Arc;

/// Answers the read-path queries of the API and CLI
pub struct QueryService {
    walker: Walker,
    indexer: Arc<Indexer>,
    listing_page_cap: u32,
}

impl QueryService {
    pub fn new(walker: Walker, indexer: Arc<Indexer>, listing_page_cap: u32) -> Self {
        Self {
            walker,
            indexer,
            listing_page_cap,
        }
    }

    /// Builds an HTTP-backed service sharing `indexer`'s storage
    pub fn from_config(config: &Config, indexer: Arc<Indexer>) -> Result<Self> {
        Ok(Self::new(
            Walker::from_config(config)?,
            indexer,
            config.crawler.listing_page_cap,
        ))
    }

    pub fn indexer(&self) -> &Arc<Indexer> {
        &self.indexer
    }

    /// Indexed title search
    pub fn search(&self, query: &str) -> Result<Vec<IndexDocument>> {
        self.indexer.search(query)
    }

    /// Year categories on the seed page
    pub async fn categories(&self) -> Result<Vec<CategoryEntry>> {
        self.walker.categories().await
    }

    /// Listings of a category across up to `pages` pages
    ///
    /// Year-navigation labels the classifier let through are dropped, and
    /// stored posters and descriptions are filled in.
    pub async fn listings(&self, year_url: &str, pages: Option<u32>) -> Result<Vec<IndexDocument>> {
        let base = if year_url.ends_with('/') {
            year_url.to_string()
        } else {
            format!("{}/", year_url)
        };
        let cap = pages.unwrap_or(self.listing_page_cap);

        let listings: Vec<ListingEntry> = self
            .walker
            .listings(&base, Some(cap))
            .await
            .into_iter()
            .filter(|listing| !is_navigation_title(&listing.title))
            .collect();

        tracing::debug!("{} listings under {} ({} pages max)", listings.len(), base, cap);
        self.indexer.enrich(listings)
    }

    /// Quality variants of a listing
    pub async fn details(&self, movie_url: &str) -> Result<Vec<VariantEntry>> {
        self.walker.qualities(movie_url).await
    }

    /// File entries below a quality variant
    pub async fn files(&self, quality_url: &str) -> Result<Vec<VariantEntry>> {
        self.walker.files(quality_url).await
    }

    /// Final link behind the first download server of a file page
    pub async fn stream(&self, file_url: &str) -> Result<String> {
        let servers = self.walker.servers(file_url).await?;
        let server = servers
            .first()
            .ok_or_else(|| StrataError::not_found("No download servers found"))?;

        self.walker
            .resolve_final_link(&server.link)
            .await?
            .ok_or_else(|| StrataError::not_found("Could not resolve final link"))
    }

    /// Best quality, file and server of a listing, resolved to a stream
    pub async fn auto_stream(&self, movie_url: &str) -> Result<StreamResolution> {
        match self.walker.best_stream(movie_url).await? {
            StreamOutcome::Resolved(resolution) => Ok(resolution),
            StreamOutcome::Missing(level) => Err(StrataError::not_found(level.describe())),
        }
    }
}

/// Labels such as "Tamil 2024 Movies" that link to other categories
fn is_navigation_title(title: &str) -> bool {
    title.starts_with("Tamil") || title.contains("Movies")
}
