//! Poster and synopsis extraction from listing detail pages
//!
//! Detail pages have no stable markup for their information block, so the
//! synopsis is picked from several candidate blocks and trimmed of the
//! boilerplate the site wraps around it.

use crate::classify::{collapse_whitespace, element_text};
use crate::url::Origin;
use crate::walker::MetadataRecord;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};

/// Image sources containing any of these are icons, not posters
const ICON_MARKERS: &[&str] = &["folder", "arrow", "dir"];

/// Keywords a trimmed block must contain to count as a description
const DESCRIPTION_KEYWORDS: &[&str] = &["Director", "Synopsis", "Movie:"];

/// Minimum trimmed length (in characters) of a valid description, exclusive
const MIN_DESCRIPTION_CHARS: usize = 30;

const INFO_MARKER: &str = "Movie Information";

/// Extracts metadata from listing detail pages of one site
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    info_marker: Regex,
    synopsis_marker: Regex,
    stop_markers: Vec<Regex>,
}

impl MetadataExtractor {
    /// Builds an extractor for a site whose footer says "<site_name> Home"
    pub fn new(site_name: &str) -> Self {
        let site_home = format!(r"{}\s+Home", words_pattern(site_name));
        let stops = [
            r"Incoming\s+Search\s+Terms",
            r"Page\s+Tags",
            site_home.as_str(),
            r"Disclaimer",
            r"A-Z\s+Movie\s+Categories",
            r"Join\s+our\s+Telegram",
        ];

        Self {
            info_marker: case_insensitive(r"Movie\s+Information"),
            synopsis_marker: case_insensitive(r"Synopsis\s*:"),
            stop_markers: stops.iter().map(|p| case_insensitive(p)).collect(),
        }
    }

    /// Extracts poster and description from a parsed detail page
    pub fn extract(&self, document: &Html, origin: &Origin) -> MetadataRecord {
        MetadataRecord {
            poster: extract_poster(document, origin),
            desc: self.extract_description(document),
        }
    }

    /// Extracts metadata from raw HTML
    pub fn extract_html(&self, html: &str, origin: &Origin) -> MetadataRecord {
        self.extract(&Html::parse_document(html), origin)
    }

    /// Picks the best description block, if any qualifies
    pub fn extract_description(&self, document: &Html) -> Option<String> {
        let mut best: Option<String> = None;

        for candidate in self.candidates(document) {
            let Some(cleaned) = self.clean(&candidate) else {
                continue;
            };

            if cleaned.contains(INFO_MARKER) {
                return Some(cleaned);
            }
            if best.is_none() {
                best = Some(cleaned);
            }
        }

        best
    }

    /// Trims a candidate block and validates it
    ///
    /// Everything before "Movie Information" and everything from the first
    /// stop marker onward is dropped.
    pub fn clean(&self, text: &str) -> Option<String> {
        let mut cleaned = collapse_whitespace(text);

        if let Some(found) = self.info_marker.find(&cleaned) {
            cleaned = cleaned[found.start()..].to_string();
        }

        let cut = self
            .stop_markers
            .iter()
            .filter_map(|marker| marker.find(&cleaned).map(|m| m.start()))
            .min();
        if let Some(cut) = cut {
            cleaned.truncate(cut);
        }

        let cleaned = cleaned.trim().to_string();
        let valid = cleaned.chars().count() > MIN_DESCRIPTION_CHARS
            && DESCRIPTION_KEYWORDS.iter().any(|k| cleaned.contains(k));

        valid.then_some(cleaned)
    }

    fn candidates(&self, document: &Html) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(text) = self.parent_of_text_matching(document, &self.info_marker) {
            candidates.push(text);
        }
        if let Some(text) = self.parent_of_text_matching(document, &self.synopsis_marker) {
            candidates.push(text);
        }

        let blocks = Selector::parse("p, div, font").expect("valid block selector");
        for element in document.select(&blocks) {
            let text = element_text(element);
            let lower = text.to_lowercase();
            if lower.contains("director:") || lower.contains("synopsis:") {
                candidates.push(text);
            }
        }

        candidates
    }

    /// Text of the element directly containing the first text node matching `pattern`
    fn parent_of_text_matching(&self, document: &Html, pattern: &Regex) -> Option<String> {
        document
            .root_element()
            .descendants()
            .filter(|node| {
                node.value()
                    .as_text()
                    .map(|text| pattern.is_match(text))
                    .unwrap_or(false)
            })
            .find_map(|node| node.parent().and_then(ElementRef::wrap))
            .map(element_text)
    }
}

/// First image that is not a navigation icon, resolved to an absolute URL
pub fn extract_poster(document: &Html, origin: &Origin) -> Option<String> {
    let selector = Selector::parse("img[src]").expect("valid image selector");

    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .find(|src| !ICON_MARKERS.iter().any(|marker| src.contains(marker)))
        .and_then(|src| origin.resolve(src).ok())
}

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("valid marker regex")
}

/// Escapes a free-text name, letting any run of whitespace match between words
fn words_pattern(name: &str) -> String {
    name.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}
