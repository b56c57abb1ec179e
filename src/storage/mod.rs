//! Storage module for the listing index
//!
//! This module handles all database operations for the index, including:
//! - SQLite database initialization and schema management
//! - Listing document upserts, lookups and title search
//! - Crawl run bookkeeping and interruption recovery

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::IndexConfig;
use crate::walker::{ListingEntry, MetadataRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Most documents a single search returns
pub const SEARCH_LIMIT: usize = 50;

/// Index handle shared by the crawl pass and the query path
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Opens (creating if needed) the index database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Opens the configured index, or `None` when no database path is set
pub fn open_shared(config: &IndexConfig) -> StorageResult<Option<SharedStorage>> {
    match config.database_path.as_deref() {
        Some(path) => {
            let storage = open_storage(Path::new(path))?;
            tracing::info!("Opened index at {}", path);
            Ok(Some(Arc::new(Mutex::new(storage))))
        }
        None => {
            tracing::info!("No index database configured; index features disabled");
            Ok(None)
        }
    }
}

/// A listing as persisted in the index, keyed by `link`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub link: String,
    pub title: String,
    pub year_category: Option<String>,
    pub poster: Option<String>,
    pub desc: Option<String>,
    /// RFC 3339 time of the last upsert; set by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<String>,
}

impl IndexDocument {
    /// Merges a listing with its metadata
    pub fn from_listing(listing: &ListingEntry, metadata: MetadataRecord) -> Self {
        Self {
            link: listing.link.clone(),
            title: listing.title.clone(),
            year_category: listing.year_category.clone(),
            poster: metadata.poster,
            desc: metadata.desc,
            indexed_at: None,
        }
    }

    pub fn metadata(&self) -> MetadataRecord {
        MetadataRecord {
            poster: self.poster.clone(),
            desc: self.desc.clone(),
        }
    }

    /// Whether deep indexing already produced a poster for this listing
    pub fn is_enriched(&self) -> bool {
        self.poster.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Represents a crawl run
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Index-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: u64,
    /// Documents with a poster
    pub enriched: u64,
    /// Document count per year category, largest first
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub documents: u64,
}
