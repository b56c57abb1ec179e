//! Crawler coordinator - one indexing pass over the whole site
//!
//! This module contains the crawl loop that keeps the listing index fresh:
//! - Guarding against overlapping passes
//! - Recording each pass as a run (and recovering runs left running)
//! - Walking every category page by page
//! - Deep-indexing listings that have no poster yet
//! - Pacing writes so the site is not hammered

use crate::config::Config;
use crate::storage::{
    IndexDocument, IndexStats, RunRecord, RunStatus, SharedStorage, SqliteStorage, Storage,
    StorageResult, SEARCH_LIMIT,
};
use crate::walker::{ListingEntry, MetadataRecord, PagerStop, Walker};
use crate::{Result, StrataError};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters for one crawl pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub run_id: i64,
    pub categories: u64,
    pub pages: u64,
    pub upserted: u64,
    /// Listings deep-indexed in this pass
    pub enriched: u64,
    /// Listings whose stored poster made deep indexing unnecessary
    pub skipped: u64,
    /// Listings seen again later in the same pass
    pub duplicates: u64,
    pub enrichment_failures: u64,
    /// Categories whose first page could not be fetched
    pub category_failures: u64,
}

/// What happened when a pass was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(CrawlReport),
    /// Another pass holds the guard
    AlreadyRunning,
    /// No index is configured
    Disabled,
}

/// Index state as reported to operators
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub enabled: bool,
    pub running: bool,
    pub latest_run: Option<RunRecord>,
    pub stats: Option<IndexStats>,
}

/// Exclusive right to run a pass; resets the running flag when dropped
///
/// Owned so a caller can claim the pass before handing it to a spawned task.
#[derive(Debug)]
pub struct PassGuard(Arc<AtomicBool>);

impl PassGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs crawl passes and answers index queries
///
/// The indexer owns its walker (and so its own origin tracking); on-demand
/// queries use a separate walker and share only the storage.
pub struct Indexer {
    walker: Walker,
    storage: Option<SharedStorage>,
    pacing_delay: Duration,
    config_hash: String,
    running: Arc<AtomicBool>,
}

impl Indexer {
    pub fn new(walker: Walker, storage: Option<SharedStorage>, pacing_delay: Duration) -> Self {
        Self {
            walker,
            storage,
            pacing_delay,
            config_hash: String::new(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Builds an HTTP-backed indexer from configuration
    pub fn from_config(config: &Config, storage: Option<SharedStorage>) -> Result<Self> {
        Ok(Self::new(
            Walker::from_config(config)?,
            storage,
            Duration::from_millis(config.crawler.pacing_delay),
        ))
    }

    /// Records which configuration produced the runs of this indexer
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.storage.is_some()
    }

    /// Whether a pass is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn storage(&self) -> Option<&SharedStorage> {
        self.storage.as_ref()
    }

    /// Claims the pass guard, or `None` while another pass holds it
    pub fn try_begin_pass(&self) -> Option<PassGuard> {
        PassGuard::acquire(&self.running)
    }

    /// Runs one full pass over every category
    ///
    /// A second call while a pass is active, or a call without an index, is
    /// a logged no-op. Failures that abort the pass mark its run failed and
    /// come back as [`StrataError::CriticalCrawl`].
    pub async fn run_pass(&self) -> Result<PassOutcome> {
        let Some(guard) = self.try_begin_pass() else {
            tracing::info!("Crawl pass already running");
            return Ok(PassOutcome::AlreadyRunning);
        };

        self.run_claimed_pass(guard).await
    }

    /// Runs a pass whose guard the caller already holds
    pub async fn run_claimed_pass(&self, _guard: PassGuard) -> Result<PassOutcome> {
        if self.storage.is_none() {
            tracing::info!("No index configured, skipping crawl pass");
            return Ok(PassOutcome::Disabled);
        }

        let run_id = self.with_storage(|storage| {
            let stale = storage.mark_interrupted_runs()?;
            if stale > 0 {
                tracing::warn!("Marked {} unfinished run(s) as interrupted", stale);
            }
            storage.create_run(&self.config_hash)
        })?;

        tracing::info!("Starting crawl run {}", run_id);
        let mut report = CrawlReport {
            run_id,
            ..CrawlReport::default()
        };

        match self.crawl(&mut report).await {
            Ok(()) => {
                self.with_storage(|storage| storage.finish_run(run_id, RunStatus::Completed))?;
                tracing::info!(
                    "Run {} complete: {} categories, {} pages, {} upserted ({} enriched, {} skipped, {} failed)",
                    run_id,
                    report.categories,
                    report.pages,
                    report.upserted,
                    report.enriched,
                    report.skipped,
                    report.enrichment_failures
                );
                Ok(PassOutcome::Completed(report))
            }
            Err(e) => {
                tracing::error!("Critical failure in run {}: {}", run_id, e);
                if let Err(finish) =
                    self.with_storage(|storage| storage.finish_run(run_id, RunStatus::Failed))
                {
                    tracing::warn!("Could not mark run {} failed: {}", run_id, finish);
                }
                Err(StrataError::CriticalCrawl(e.to_string()))
            }
        }
    }

    async fn crawl(&self, report: &mut CrawlReport) -> Result<()> {
        let categories = self.walker.categories().await?;
        tracing::info!("Found {} year categories", categories.len());

        let mut seen = HashSet::new();

        for category in &categories {
            report.categories += 1;
            tracing::info!("Scanning {}...", category.name);

            let mut pager = self
                .walker
                .listing_pages(&category.link, Some(category.name.clone()), None);

            while let Some(page) = pager.next_page().await {
                report.pages += 1;
                tracing::debug!("Page {} of {}: {} listings", page.number, category.name, page.entries.len());

                for listing in page.entries {
                    if !seen.insert(listing.link.clone()) {
                        report.duplicates += 1;
                        continue;
                    }

                    self.index_listing(&listing, report).await?;
                    tokio::time::sleep(self.pacing_delay).await;
                }
            }

            if pager.pages_read() == 0 && pager.stopped() == Some(PagerStop::FetchFailed) {
                tracing::warn!("Skipping {}: first page could not be fetched", category.name);
                report.category_failures += 1;
            }
        }

        Ok(())
    }

    /// Deep-indexes (when needed) and persists one listing
    async fn index_listing(&self, listing: &ListingEntry, report: &mut CrawlReport) -> Result<()> {
        let existing = self.with_storage(|storage| storage.get_document(&listing.link))?;

        let metadata = match existing {
            Some(document) if document.is_enriched() => {
                tracing::debug!("Skipping deep index for {} (already indexed)", listing.title);
                report.skipped += 1;
                document.metadata()
            }
            existing => match self.walker.detail(&listing.link).await {
                Ok(detail) => {
                    tracing::debug!("Deep indexed: {}", listing.title);
                    report.enriched += 1;
                    detail.metadata
                }
                Err(e) => {
                    tracing::warn!("Failed deep index for {}: {}", listing.title, e);
                    report.enrichment_failures += 1;
                    existing
                        .map(|document| document.metadata())
                        .unwrap_or_default()
                }
            },
        };

        let document = IndexDocument::from_listing(listing, metadata);
        self.with_storage(|storage| storage.upsert_document(&document))?;
        report.upserted += 1;

        Ok(())
    }

    /// Title search over the index; empty without an index
    pub fn search(&self, query: &str) -> Result<Vec<IndexDocument>> {
        if self.storage.is_none() || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.with_storage(|storage| storage.search(query, SEARCH_LIMIT))
    }

    /// Fills in stored posters and descriptions for freshly read listings
    ///
    /// Listings without a stored document come back with empty metadata.
    pub fn enrich(&self, listings: Vec<ListingEntry>) -> Result<Vec<IndexDocument>> {
        let stored = match &self.storage {
            Some(_) => {
                let links: Vec<String> = listings.iter().map(|l| l.link.clone()).collect();
                self.with_storage(|storage| storage.find_by_links(&links))?
            }
            None => Default::default(),
        };

        Ok(listings
            .iter()
            .map(|listing| {
                let metadata = stored
                    .get(&listing.link)
                    .map(IndexDocument::metadata)
                    .unwrap_or_else(MetadataRecord::default);
                IndexDocument::from_listing(listing, metadata)
            })
            .collect())
    }

    /// Guard state, latest run and index counters
    pub fn status(&self) -> Result<IndexStatus> {
        let (latest_run, stats) = match &self.storage {
            Some(_) => self.with_storage(|storage| {
                Ok((storage.get_latest_run()?, Some(storage.stats()?)))
            })?,
            None => (None, None),
        };

        Ok(IndexStatus {
            enabled: self.is_enabled(),
            running: self.is_running(),
            latest_run,
            stats,
        })
    }

    /// Runs `f` against the locked storage; never held across an await
    fn with_storage<T>(
        &self,
        f: impl FnOnce(&mut SqliteStorage) -> StorageResult<T>,
    ) -> Result<T> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| StrataError::CriticalCrawl("index is not configured".to_string()))?;
        let mut guard = storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(f(&mut *guard)?)
    }
}
