//! Storage traits and error types
//!
//! This module defines the trait interface for index backends and
//! associated error types.

use crate::storage::{IndexDocument, IndexStats, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index backend implementations
///
/// Documents are never deleted; an upsert replaces every stored field of the
/// document with the same link.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets a run's final status and finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks every run still `running` as `interrupted`
    ///
    /// Returns the number of runs updated.
    fn mark_interrupted_runs(&mut self) -> StorageResult<usize>;

    // ===== Documents =====

    /// Inserts or overwrites the document with the same link
    fn upsert_document(&mut self, document: &IndexDocument) -> StorageResult<()>;

    /// Gets a document by link
    fn get_document(&self, link: &str) -> StorageResult<Option<IndexDocument>>;

    /// Gets every stored document among `links`, keyed by link
    fn find_by_links(&self, links: &[String]) -> StorageResult<HashMap<String, IndexDocument>>;

    /// Case-insensitive substring search on titles
    ///
    /// `limit` is clamped to [`crate::storage::SEARCH_LIMIT`]; an empty
    /// pattern matches nothing.
    fn search(&self, pattern: &str, limit: usize) -> StorageResult<Vec<IndexDocument>>;

    // ===== Statistics =====

    /// Gets document counts for the whole index
    fn stats(&self) -> StorageResult<IndexStats>;
}
