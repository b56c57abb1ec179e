//! Link classification for each level of the site hierarchy
//!
//! The site's markup does not distinguish levels structurally, so every level
//! is read the same way (anchors with visible text and an href) and told apart
//! by per-role heuristics. See [`rules`] for the reject tables.

mod hop;
pub mod rules;

pub use hop::{inspect_hop, HopStep};
pub use rules::{rules_for, Rule};

use crate::url::Origin;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// The hierarchy level a page is being read as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Year index on the root page
    Category,
    /// Content items on a (paged) category page
    Listing,
    /// Quality variants on a listing detail page
    Quality,
    /// File entries below a quality variant
    File,
    /// Download-server buttons on a file page
    Server,
}

impl Role {
    /// Returns the name of the first rule rejecting `candidate`, if any
    pub fn rejection(&self, candidate: &LinkCandidate) -> Option<&'static str> {
        rules_for(*self)
            .iter()
            .find(|rule| (rule.rejects)(candidate))
            .map(|rule| rule.name)
    }

    /// Whether accepted links are collapsed by absolute URL
    fn deduplicates(&self) -> bool {
        matches!(self, Self::Listing | Self::Quality | Self::File)
    }

    /// Whether candidates come from `div.f` blocks before falling back to all anchors
    fn prefers_blocks(&self) -> bool {
        matches!(self, Self::Quality | Self::File)
    }
}

/// An anchor as found on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Visible text with whitespace collapsed
    pub text: String,
    /// Raw href attribute
    pub href: Option<String>,
}

impl LinkCandidate {
    pub fn new(text: &str, href: Option<&str>) -> Self {
        Self {
            text: collapse_whitespace(text),
            href: href.map(str::to_string),
        }
    }

    /// The href, if present and non-blank
    pub fn href(&self) -> Option<&str> {
        self.href
            .as_deref()
            .map(str::trim)
            .filter(|href| !href.is_empty())
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        Self {
            text: element_text(element),
            href: element.value().attr("href").map(str::to_string),
        }
    }
}

/// An accepted link, resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    pub text: String,
    pub link: String,
}

/// Classifies the anchors of an HTML document for the given role
///
/// Results keep document order, which approximates the site's own ranking.
pub fn classify_html(html: &str, role: Role, origin: &Origin) -> Vec<ClassifiedLink> {
    let document = Html::parse_document(html);
    classify(&document, role, origin)
}

/// Classifies the anchors of a parsed document for the given role
pub fn classify(document: &Html, role: Role, origin: &Origin) -> Vec<ClassifiedLink> {
    let candidates = if role.prefers_blocks() {
        block_anchors(document)
    } else {
        anchors(document)
    };

    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        if let Some(rule) = role.rejection(&candidate) {
            tracing::trace!("{:?}: '{}' rejected by {}", role, candidate.text, rule);
            continue;
        }

        // Accepted candidates always carry an href; server links only require one
        let Some(href) = candidate.href() else {
            continue;
        };

        let link = match origin.resolve(href) {
            Ok(link) => link,
            Err(e) => {
                tracing::debug!("Skipping unresolvable href '{}': {}", href, e);
                continue;
            }
        };

        if role.deduplicates() && !seen.insert(link.clone()) {
            continue;
        }

        accepted.push(ClassifiedLink {
            text: candidate.text,
            link,
        });
    }

    accepted
}

/// Every anchor in the document, in order
pub fn anchors(document: &Html) -> Vec<LinkCandidate> {
    let selector = anchor_selector();
    document
        .select(&selector)
        .map(LinkCandidate::from_element)
        .collect()
}

/// The first anchor inside each `div.f` block; all anchors if there are no blocks
pub fn block_anchors(document: &Html) -> Vec<LinkCandidate> {
    let block_selector = Selector::parse("div.f").expect("valid block selector");
    let anchor = anchor_selector();

    let blocks: Vec<_> = document.select(&block_selector).collect();
    if blocks.is_empty() {
        return anchors(document);
    }

    blocks
        .into_iter()
        .filter_map(|block| block.select(&anchor).next())
        .map(LinkCandidate::from_element)
        .collect()
}

/// Text content of an element with whitespace collapsed to single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn anchor_selector() -> Selector {
    Selector::parse("a").expect("valid anchor selector")
}
