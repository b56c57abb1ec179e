//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    CategoryCount, IndexDocument, IndexStats, RunRecord, RunStatus, SEARCH_LIMIT,
};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// Links looked up per `IN (...)` query
const LOOKUP_CHUNK: usize = 500;

const DOCUMENT_COLUMNS: &str = "link, title, year_category, poster, description, indexed_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Readers (the query path) should not block the crawl's writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Interrupted),
    })
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<IndexDocument> {
    Ok(IndexDocument {
        link: row.get(0)?,
        title: row.get(1)?,
        year_category: row.get(2)?,
        poster: row.get(3)?,
        desc: row.get(4)?,
        indexed_at: row.get(5)?,
    })
}

/// Escapes LIKE wildcards so the pattern matches literally
fn like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn mark_interrupted_runs(&mut self) -> StorageResult<usize> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE status = ?2",
            params![
                RunStatus::Interrupted.to_db_string(),
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(updated)
    }

    // ===== Documents =====

    fn upsert_document(&mut self, document: &IndexDocument) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents
                (link, title, title_folded, year_category, poster, description, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(link) DO UPDATE SET
                title = excluded.title,
                title_folded = excluded.title_folded,
                year_category = excluded.year_category,
                poster = excluded.poster,
                description = excluded.description,
                indexed_at = excluded.indexed_at",
            params![
                document.link,
                document.title,
                document.title.to_lowercase(),
                document.year_category,
                document.poster,
                document.desc,
                now
            ],
        )?;
        Ok(())
    }

    fn get_document(&self, link: &str) -> StorageResult<Option<IndexDocument>> {
        let document = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE link = ?1", DOCUMENT_COLUMNS),
                params![link],
                document_from_row,
            )
            .optional()?;

        Ok(document)
    }

    fn find_by_links(&self, links: &[String]) -> StorageResult<HashMap<String, IndexDocument>> {
        let mut found = HashMap::new();

        for chunk in links.chunks(LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM documents WHERE link IN ({})",
                DOCUMENT_COLUMNS, placeholders
            ))?;

            let rows = stmt.query_map(params_from_iter(chunk.iter()), document_from_row)?;
            for row in rows {
                let document = row?;
                found.insert(document.link.clone(), document);
            }
        }

        Ok(found)
    }

    fn search(&self, pattern: &str, limit: usize) -> StorageResult<Vec<IndexDocument>> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit.min(SEARCH_LIMIT);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM documents
             WHERE title_folded LIKE ?1 ESCAPE '\\'
             ORDER BY rowid
             LIMIT ?2",
            DOCUMENT_COLUMNS
        ))?;

        let documents = stmt
            .query_map(
                params![like_pattern(&pattern.to_lowercase()), limit as i64],
                document_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }

    // ===== Statistics =====

    fn stats(&self) -> StorageResult<IndexStats> {
        let (documents, enriched): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COUNT(CASE WHEN poster IS NOT NULL AND poster != '' THEN 1 END)
             FROM documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(year_category, ''), COUNT(*) FROM documents
             GROUP BY year_category
             ORDER BY COUNT(*) DESC, year_category",
        )?;
        let categories = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    name: row.get(0)?,
                    documents: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IndexStats {
            documents: documents as u64,
            enriched: enriched as u64,
            categories,
        })
    }
}
