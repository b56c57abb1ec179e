//! Crawler module for fetching and indexing
//!
//! This module contains the fetch and crawl plumbing, including:
//! - HTTP fetching behind the `DocumentFetcher` seam
//! - Per-walker sessions that track the served origin
//! - Indexing passes over the whole site

mod coordinator;
mod fetcher;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{CrawlReport, IndexStatus, Indexer, PassGuard, PassOutcome};
pub use fetcher::{build_http_client, DocumentFetcher, FetchError, FetchedPage, HttpFetcher};
pub use session::Session;

use crate::config::Config;
use crate::storage::open_shared;
use crate::Result;

/// Runs a single indexing pass
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Open the configured index (a no-op pass without one)
/// 2. Walk every category and its listing pages
/// 3. Deep-index listings that are not yet enriched
/// 4. Record the run and return its outcome
pub async fn crawl(config: &Config, config_hash: &str) -> Result<PassOutcome> {
    let storage = open_shared(&config.index)?;
    let indexer = Indexer::from_config(config, storage)?.with_config_hash(config_hash);
    indexer.run_pass().await
}
