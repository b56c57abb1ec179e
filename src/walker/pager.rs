//! Page-by-page iteration over a category's listings

use crate::url::page_url;
use crate::walker::{ListingEntry, Walker};
use std::collections::HashSet;

/// Why a pager stopped producing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerStop {
    /// The page cap was reached
    Cap,
    /// A page failed to fetch
    FetchFailed,
    /// A page had no accepted links
    Empty,
    /// A page only repeated links already seen in this walk
    Redundant,
}

/// One listing page with the entries it newly contributed
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub number: u32,
    pub url: String,
    pub entries: Vec<ListingEntry>,
}

/// Walks `base`, `base?page=2`, ... until a page yields nothing new
///
/// Pages are fetched lazily; the caller can stop at any point without the
/// next page ever being requested.
pub struct ListingPager<'a> {
    walker: &'a Walker,
    base: String,
    year_category: Option<String>,
    cap: Option<u32>,
    next: u32,
    seen: HashSet<String>,
    stopped: Option<PagerStop>,
}

impl<'a> ListingPager<'a> {
    pub(crate) fn new(
        walker: &'a Walker,
        base: impl Into<String>,
        year_category: Option<String>,
        cap: Option<u32>,
    ) -> Self {
        Self {
            walker,
            base: base.into(),
            year_category,
            cap,
            next: 1,
            seen: HashSet::new(),
            stopped: None,
        }
    }

    /// Fetches the next page, returning `None` once pagination has ended
    pub async fn next_page(&mut self) -> Option<ListingPage> {
        if self.stopped.is_some() {
            return None;
        }

        let number = self.next;
        if self.cap.is_some_and(|cap| number > cap) {
            return self.stop(PagerStop::Cap);
        }

        let url = page_url(&self.base, number);
        let entries = match self
            .walker
            .listing_page(&url, self.year_category.as_deref())
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Stopping pagination at {}: {}", url, e);
                return self.stop(PagerStop::FetchFailed);
            }
        };

        if entries.is_empty() {
            tracing::debug!("No listings on {}, pagination finished", url);
            return self.stop(PagerStop::Empty);
        }

        let fresh: Vec<ListingEntry> = entries
            .into_iter()
            .filter(|entry| self.seen.insert(entry.link.clone()))
            .collect();

        if fresh.is_empty() {
            tracing::debug!("{} repeats earlier pages, pagination finished", url);
            return self.stop(PagerStop::Redundant);
        }

        self.next += 1;
        Some(ListingPage {
            number,
            url,
            entries: fresh,
        })
    }

    /// Number of pages that produced entries
    pub fn pages_read(&self) -> u32 {
        self.next - 1
    }

    /// The reason pagination ended, if it has
    pub fn stopped(&self) -> Option<PagerStop> {
        self.stopped
    }

    fn stop(&mut self, reason: PagerStop) -> Option<ListingPage> {
        self.stopped = Some(reason);
        None
    }
}
