//! Strata: a resilient walker for nested listing sites
//!
//! This crate descends a site's navigation hierarchy (category → listing → quality →
//! file → server → final media link) using ranked heuristics that tolerate unstable
//! markup, and keeps a persistent index of discovered listings for search and
//! metadata backfill.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod metadata;
pub mod query;
pub mod server;
pub mod storage;
pub mod url;
pub mod walker;

use thiserror::Error;

pub use crate::crawler::FetchError;

/// Main error type for Strata operations
#[derive(Debug, Error)]
pub enum StrataError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Critical crawl failure: {0}")]
    CriticalCrawl(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl StrataError {
    /// Builds a not-found error for the given level or item
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true for expected terminal outcomes (nothing to resolve)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Cannot join '{reference}' onto {base}: {message}")]
    Join {
        base: String,
        reference: String,
        message: String,
    },
}

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::crawler::{Indexer, Session};
pub use crate::query::QueryService;
pub use crate::storage::{IndexDocument, SqliteStorage};
pub use crate::url::Origin;
pub use crate::walker::{
    CategoryEntry, ListingEntry, MetadataRecord, StreamResolution, VariantEntry, Walker,
};
