//! # Memory Store
//!
//! Row-level access to persisted memories using the shared EngramDb
//! connection. A memory is one question/response exchange plus the flag
//! saying whether it was judged worth long-term retention.
//!
//! Rows are insert-only. Nothing in the system updates or deletes a
//! memory once written.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use crate::state::db::EngramDb;

/// A persisted memory row
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemoryRecord {
    pub id: i64,
    pub question: String,
    pub response: String,
    pub long_term: bool,
    pub created_at: String,
}

/// SQLite-backed memory store using the shared EngramDb connection
pub struct MemoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl MemoryStore {
    /// Create from shared EngramDb connection
    pub fn new(db: &EngramDb) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    /// Insert a memory row, returning the stored record
    pub fn insert(&self, question: &str, response: &str, long_term: bool) -> Result<MemoryRecord> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.execute(
            "INSERT INTO memories (question, response, long_term) VALUES (?1, ?2, ?3)",
            params![question, response, long_term as i64],
        )
        .context("Failed to insert memory")?;

        let id = conn.last_insert_rowid();
        let created_at: String = conn.query_row(
            "SELECT created_at FROM memories WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(MemoryRecord {
            id,
            question: question.to_string(),
            response: response.to_string(),
            long_term,
            created_at,
        })
    }

    /// Fetch a memory by id
    pub fn get(&self, id: i64) -> Result<Option<MemoryRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.query_row(
            r#"
            SELECT id, question, response, long_term, created_at
            FROM memories
            WHERE id = ?1
            "#,
            params![id],
            Self::map_row,
        )
        .optional()
        .context("Failed to fetch memory")
    }

    /// List memories, newest first
    pub fn list(&self, limit: usize) -> Result<Vec<MemoryRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, question, response, long_term, created_at
            FROM memories
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let entries = stmt
            .query_map(params![limit as i64], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list memories")?;

        Ok(entries)
    }

    /// Search memories by keyword (simple LIKE over question and response)
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT id, question, response, long_term, created_at
            FROM memories
            WHERE question LIKE ?1 OR response LIKE ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![pattern, limit as i64], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect search results")?;

        Ok(entries)
    }

    /// Get count of memories
    pub fn count(&self) -> Result<i64> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
        Ok(MemoryRecord {
            id: row.get(0)?,
            question: row.get(1)?,
            response: row.get(2)?,
            long_term: row.get::<_, i64>(3)? != 0,
            created_at: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_memory_store_round_trip() {
        let path = ".engram/test_memory_store.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let store = MemoryStore::new(&db);

        let saved = store
            .insert(
                "What is the capital of France?",
                "The capital of France is Paris.",
                true,
            )
            .unwrap();

        assert!(saved.id > 0);
        assert!(saved.long_term);

        let fetched = store.get(saved.id).unwrap().expect("row should exist");
        assert_eq!(fetched.question, "What is the capital of France?");
        assert_eq!(fetched.response, "The capital of France is Paris.");
        assert!(fetched.long_term);

        assert_eq!(store.count().unwrap(), 1);

        // Cleanup
        drop(db);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_memory_store_search() {
        let path = ".engram/test_memory_search.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let store = MemoryStore::new(&db);

        store
            .insert("Where is Paris?", "Paris is in France.", true)
            .unwrap();
        store
            .insert("Where is Kyoto?", "Kyoto is in Japan.", true)
            .unwrap();
        store
            .insert("Favourite colour?", "You said it was green.", false)
            .unwrap();

        // Matches question text
        let results = store.search("Paris", 10).unwrap();
        assert_eq!(results.len(), 1);

        // Matches response text too
        let results = store.search("Japan", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question, "Where is Kyoto?");

        let results = store.search("nowhere", 10).unwrap();
        assert!(results.is_empty());

        drop(db);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_memory_store_list_newest_first() {
        let path = ".engram/test_memory_list.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let store = MemoryStore::new(&db);

        store.insert("first?", "first.", true).unwrap();
        store.insert("second?", "second.", false).unwrap();

        let all = store.list(10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].question, "second?");

        let limited = store.list(1).unwrap();
        assert_eq!(limited.len(), 1);

        drop(db);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_memory_is_none() {
        let path = ".engram/test_memory_missing.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let store = MemoryStore::new(&db);

        assert!(store.get(42).unwrap().is_none());

        drop(db);
        let _ = fs::remove_file(path);
    }
}
