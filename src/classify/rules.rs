//! Declarative reject rules per link role
//!
//! A candidate is accepted by a role when none of that role's rules fire.
//! Every rule carries a name so a page that classifies badly can be
//! diagnosed one rule at a time.

use crate::classify::{LinkCandidate, Role};
use regex::Regex;
use std::sync::OnceLock;

/// A single named reject condition
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub rejects: fn(&LinkCandidate) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

const CATEGORY_RULES: &[Rule] = &[
    Rule {
        name: "not-year-category",
        rejects: not_year_category,
    },
    Rule {
        name: "missing-href",
        rejects: missing_href,
    },
];

const LISTING_RULES: &[Rule] = &[
    Rule {
        name: "missing-href",
        rejects: missing_href,
    },
    Rule {
        name: "pagination-href",
        rejects: pagination_href,
    },
    Rule {
        name: "single-character-text",
        rejects: single_character_text,
    },
    Rule {
        name: "numeric-index",
        rejects: numeric_index,
    },
    Rule {
        name: "community-link",
        rejects: community_link,
    },
    Rule {
        name: "year-navigation",
        rejects: year_navigation,
    },
];

const VARIANT_RULES: &[Rule] = &[
    Rule {
        name: "missing-href",
        rejects: missing_href,
    },
    Rule {
        name: "pagination-href",
        rejects: pagination_href,
    },
    Rule {
        name: "messenger-link",
        rejects: messenger_link,
    },
];

const SERVER_RULES: &[Rule] = &[
    Rule {
        name: "missing-href",
        rejects: missing_href,
    },
    Rule {
        name: "navigation-text",
        rejects: navigation_text,
    },
    Rule {
        name: "no-server-keyword",
        rejects: no_server_keyword,
    },
];

/// Returns the reject rules applied for a role, in evaluation order
pub fn rules_for(role: Role) -> &'static [Rule] {
    match role {
        Role::Category => CATEGORY_RULES,
        Role::Listing => LISTING_RULES,
        Role::Quality | Role::File => VARIANT_RULES,
        Role::Server => SERVER_RULES,
    }
}

fn category_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\d{4}\s+Movies").expect("valid category regex"))
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{4}").expect("valid year regex"))
}

fn not_year_category(candidate: &LinkCandidate) -> bool {
    !category_pattern().is_match(&candidate.text)
}

fn missing_href(candidate: &LinkCandidate) -> bool {
    candidate.href().is_none()
}

fn pagination_href(candidate: &LinkCandidate) -> bool {
    candidate
        .href()
        .map(|href| href.to_lowercase().contains("page"))
        .unwrap_or(false)
}

fn single_character_text(candidate: &LinkCandidate) -> bool {
    candidate.text.chars().count() <= 1
}

fn numeric_index(candidate: &LinkCandidate) -> bool {
    candidate.text == "0-9"
}

fn community_link(candidate: &LinkCandidate) -> bool {
    let text = candidate.text.to_lowercase();
    text.contains("telegram") || text.contains("group")
}

/// Back-links to other year indexes, e.g. "Tamil 2025 Movies" or "2024 Movies"
fn year_navigation(candidate: &LinkCandidate) -> bool {
    let text = candidate.text.to_lowercase();
    if !text.contains("movies") || !year_pattern().is_match(&text) {
        return false;
    }
    text.ends_with("movies") && (text.starts_with("tamil") || text.starts_with("20"))
}

fn messenger_link(candidate: &LinkCandidate) -> bool {
    let text = candidate.text.to_lowercase();
    text.contains("telegram") || text.contains("whatsapp")
}

fn navigation_text(candidate: &LinkCandidate) -> bool {
    let text = candidate.text.to_lowercase();
    text.contains("home") || text.contains("back")
}

fn no_server_keyword(candidate: &LinkCandidate) -> bool {
    let text = candidate.text.to_lowercase();
    let href_mentions_download = candidate
        .href()
        .map(|href| href.to_lowercase().contains("download"))
        .unwrap_or(false);

    !(text.contains("server") || text.contains("download") || text.contains("link"))
        && !href_mentions_download
}
