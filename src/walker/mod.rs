//! Level-by-level descent through the site hierarchy
//!
//! The walker reads one level per fetch:
//! category → listing (paged) → quality → file → server → final link.
//! Pages are parsed synchronously right after each fetch; nothing parsed is
//! held across an await point.

mod entries;
mod pager;
pub mod select;
mod stream;

pub use entries::{CategoryEntry, DetailPage, ListingEntry, MetadataRecord, VariantEntry};
pub use pager::{ListingPage, ListingPager, PagerStop};
pub use select::select_best;
pub use stream::{MissingLevel, StreamOutcome, StreamResolution};

use crate::classify::{classify, classify_html, inspect_hop, ClassifiedLink, HopStep, Role};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::{DocumentFetcher, HttpFetcher, Session};
use crate::metadata::MetadataExtractor;
use crate::Result;
use scraper::Html;
use std::sync::Arc;

/// Depth limits for the recursive levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    /// Extra file levels followed while a level holds a single entry
    pub drill_depth: u32,
    /// Deepest hop (root is 0) fetched while resolving a final link
    pub resolve_depth: u32,
}

impl From<&CrawlerConfig> for WalkLimits {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            drill_depth: config.drill_depth,
            resolve_depth: config.resolve_depth,
        }
    }
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// Reads the site hierarchy through one fetch session
pub struct Walker {
    session: Session,
    extractor: MetadataExtractor,
    limits: WalkLimits,
}

/// One branch of the final-link search still holding untried hops
struct HopFrame {
    depth: u32,
    hops: std::vec::IntoIter<String>,
    refresh: Option<String>,
}

impl Walker {
    pub fn new(session: Session, extractor: MetadataExtractor, limits: WalkLimits) -> Self {
        Self {
            session,
            extractor,
            limits,
        }
    }

    /// Builds a walker with its own session over `fetcher`
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self::new(
            Session::new(fetcher, config.site.seed_url.clone()),
            MetadataExtractor::new(&config.site.site_name),
            WalkLimits::from(&config.crawler),
        )
    }

    /// Builds a walker that fetches over HTTP
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.crawler)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Year categories listed on the seed page
    pub async fn categories(&self) -> Result<Vec<CategoryEntry>> {
        let page = self.session.fetch(self.session.seed_url()).await?;
        let links = classify_html(&page.body, Role::Category, &page.origin);

        tracing::debug!("Found {} categories on {}", links.len(), page.url);
        Ok(links
            .into_iter()
            .map(|ClassifiedLink { text, link }| CategoryEntry { name: text, link })
            .collect())
    }

    /// Listings on a single category page
    pub async fn listing_page(
        &self,
        url: &str,
        year_category: Option<&str>,
    ) -> Result<Vec<ListingEntry>> {
        let page = self.session.fetch(url).await?;
        let links = classify_html(&page.body, Role::Listing, &page.origin);

        Ok(links
            .into_iter()
            .map(|ClassifiedLink { text, link }| ListingEntry {
                title: text,
                link,
                year_category: year_category.map(str::to_string),
            })
            .collect())
    }

    /// A lazy pager over a category's listing pages
    pub fn listing_pages(
        &self,
        category_url: &str,
        year_category: Option<String>,
        cap: Option<u32>,
    ) -> ListingPager<'_> {
        ListingPager::new(self, category_url, year_category, cap)
    }

    /// Every listing of a category, up to `cap` pages
    pub async fn listings(&self, category_url: &str, cap: Option<u32>) -> Vec<ListingEntry> {
        let mut pager = self.listing_pages(category_url, None, cap);
        let mut listings = Vec::new();

        while let Some(page) = pager.next_page().await {
            listings.extend(page.entries);
        }

        listings
    }

    /// Quality variants and metadata of a listing, from a single fetch
    pub async fn detail(&self, listing_url: &str) -> Result<DetailPage> {
        let page = self.session.fetch(listing_url).await?;
        let document = Html::parse_document(&page.body);

        Ok(DetailPage {
            variants: to_variants(classify(&document, Role::Quality, &page.origin)),
            metadata: self.extractor.extract(&document, &page.origin),
        })
    }

    /// Quality variants of a listing
    pub async fn qualities(&self, listing_url: &str) -> Result<Vec<VariantEntry>> {
        Ok(self.detail(listing_url).await?.variants)
    }

    /// File entries below a quality variant
    ///
    /// While a level holds exactly one entry, that entry is opened as a file
    /// page in turn (up to the drill depth). An empty or failing deeper level
    /// falls back to the single entry above it.
    pub async fn files(&self, url: &str) -> Result<Vec<VariantEntry>> {
        let mut current_url = self.session.resolve(url).await?;
        let mut current = self.variants_at(&current_url, Role::File).await?;

        for depth in 1..=self.limits.drill_depth {
            let [only] = current.as_slice() else {
                break;
            };
            if only.link == current_url {
                break;
            }

            tracing::debug!("Single entry '{}', drilling to depth {}", only.name, depth);
            let next_url = only.link.clone();
            let deeper = match self.variants_at(&next_url, Role::File).await {
                Ok(deeper) => deeper,
                Err(e) => {
                    tracing::warn!("Drill-down into {} failed: {}", next_url, e);
                    break;
                }
            };
            if deeper.is_empty() {
                break;
            }

            current = deeper;
            current_url = next_url;
        }

        Ok(current)
    }

    /// Download servers offered on a file page
    pub async fn servers(&self, url: &str) -> Result<Vec<VariantEntry>> {
        self.variants_at(url, Role::Server).await
    }

    /// Follows a server page's redirect chain to a direct media link
    ///
    /// Hops are searched depth-first in page order; the first branch yielding
    /// a link wins. A branch whose hops all fail falls back to its page's
    /// meta refresh. Returns `Ok(None)` when nothing resolves.
    pub async fn resolve_final_link(&self, url: &str) -> Result<Option<String>> {
        let current_url = self.session.resolve(url).await?;
        let page = self.session.fetch(&current_url).await?;

        let mut stack = match inspect_hop(&page.body, &page.origin, &current_url) {
            HopStep::Terminal(link) => return Ok(Some(link)),
            HopStep::Unresolved => return Ok(None),
            HopStep::Recurse { hops, refresh } => vec![HopFrame {
                depth: 0,
                hops: hops.into_iter(),
                refresh,
            }],
        };

        while let Some(frame) = stack.last_mut() {
            let Some(hop) = frame.hops.next() else {
                if let Some(target) = stack.pop().and_then(|exhausted| exhausted.refresh) {
                    tracing::debug!("Hops exhausted, following meta refresh to {}", target);
                    return Ok(Some(target));
                }
                continue;
            };

            let depth = frame.depth + 1;
            if depth > self.limits.resolve_depth {
                tracing::debug!("Not following {}: depth {} exceeds limit", hop, depth);
                continue;
            }

            match self.hop(&hop).await {
                Some(HopStep::Terminal(link)) => return Ok(Some(link)),
                Some(HopStep::Recurse { hops, refresh }) => stack.push(HopFrame {
                    depth,
                    hops: hops.into_iter(),
                    refresh,
                }),
                Some(HopStep::Unresolved) | None => {}
            }
        }

        Ok(None)
    }

    /// Fetches and inspects one nested hop; failures end only that branch
    async fn hop(&self, url: &str) -> Option<HopStep> {
        match self.session.fetch(url).await {
            Ok(page) => Some(inspect_hop(&page.body, &page.origin, url)),
            Err(e) => {
                tracing::warn!("Hop {} failed: {}", url, e);
                None
            }
        }
    }

    async fn variants_at(&self, url: &str, role: Role) -> Result<Vec<VariantEntry>> {
        let page = self.session.fetch(url).await?;
        Ok(to_variants(classify_html(&page.body, role, &page.origin)))
    }
}

fn to_variants(links: Vec<ClassifiedLink>) -> Vec<VariantEntry> {
    links
        .into_iter()
        .map(|ClassifiedLink { text, link }| VariantEntry { name: text, link })
        .collect()
}
