//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Strata index.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_runs_status ON runs(status);

-- One row per discovered listing, keyed by its absolute link
CREATE TABLE IF NOT EXISTS documents (
    link TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    -- Lowercased title; SQLite's LIKE only folds ASCII
    title_folded TEXT NOT NULL,
    year_category TEXT,
    poster TEXT,
    description TEXT,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_title_folded ON documents(title_folded);
CREATE INDEX IF NOT EXISTS idx_documents_category ON documents(year_category);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
