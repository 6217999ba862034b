//! # Unified Engram Database
//!
//! Single SQLite database for all Engram state persistence.
//! Memory rows and prompt templates share one file at `.engram/engram.db`.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::skills::prompts;

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Unified database manager for all Engram state
pub struct EngramDb {
    conn: Arc<Mutex<Connection>>,
}

impl EngramDb {
    /// Open or create the unified database at `.engram/engram.db`
    pub fn open() -> Result<Self> {
        Self::open_at(".engram/engram.db")
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(path.as_ref()).context("Failed to open engram database")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Get a shared connection for use by other modules
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Run schema migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        // Create schema version table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        // Get current version
        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        // Run migrations incrementally
        if current_version < 1 {
            self.migrate_v1(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [1],
            )?;
        }

        Ok(())
    }

    /// Migration to version 1 - complete schema
    fn migrate_v1(&self, conn: &Connection) -> Result<()> {
        // Memory rows: one exchange judged worth keeping.
        // Insert-only; no update or delete paths exist.
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS memories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                response TEXT NOT NULL,
                long_term INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
            [],
        )?;

        // Conversation turns recorded for recall context
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exchange_id TEXT NOT NULL,
                role TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
            [],
        )?;

        // Agent system prompts with version control
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS prompt_templates (
                slug TEXT PRIMARY KEY,
                version INTEGER NOT NULL DEFAULT 1,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
            [],
        )?;

        // Create indexes
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memories_question ON memories(question)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_turns_exchange ON conversation_turns(exchange_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_prompts_slug ON prompt_templates(slug)",
            [],
        )?;

        tracing::info!("EngramDb initialized with schema version {}", SCHEMA_VERSION);

        Ok(())
    }

    // =========================================================================
    // Prompt Template Methods
    // =========================================================================

    /// Seed default prompts if the table is empty
    pub fn seed_prompts(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        // Check if already seeded
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM prompt_templates", [], |row| {
            row.get(0)
        })?;

        if count > 0 {
            tracing::debug!("Prompts already seeded ({} found)", count);
            return Ok(0);
        }

        // Insert defaults
        let defaults = prompts::all_defaults();
        let mut inserted = 0;

        for (slug, content) in defaults {
            conn.execute(
                "INSERT INTO prompt_templates (slug, version, content) VALUES (?1, 1, ?2)",
                params![slug, content],
            )?;
            inserted += 1;
        }

        tracing::info!("Seeded {} default prompts", inserted);
        Ok(inserted)
    }

    /// Get a prompt by slug
    pub fn get_prompt(&self, slug: &str) -> Result<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.query_row(
            "SELECT content FROM prompt_templates WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )
        .with_context(|| format!("Prompt '{}' not found", slug))
    }

    /// Get a prompt with its version
    pub fn get_prompt_versioned(&self, slug: &str) -> Result<(String, i32)> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.query_row(
            "SELECT content, version FROM prompt_templates WHERE slug = ?1",
            params![slug],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .with_context(|| format!("Prompt '{}' not found", slug))
    }

    /// Update a prompt (increments version automatically)
    pub fn set_prompt(&self, slug: &str, content: &str) -> Result<i32> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        // Get current version or start at 0
        let current_version: i32 = conn
            .query_row(
                "SELECT version FROM prompt_templates WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .unwrap_or(0);

        let new_version = current_version + 1;

        conn.execute(
            r#"
            INSERT INTO prompt_templates (slug, version, content, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(slug) DO UPDATE SET
                version = ?2,
                content = ?3,
                updated_at = datetime('now')
            "#,
            params![slug, new_version, content],
        )?;

        tracing::debug!("Updated prompt '{}' to version {}", slug, new_version);
        Ok(new_version)
    }

    /// List all prompt slugs
    pub fn list_prompts(&self) -> Result<Vec<(String, i32)>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let mut stmt = conn.prepare("SELECT slug, version FROM prompt_templates ORDER BY slug")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut prompts = Vec::new();
        for row in rows {
            prompts.push(row?);
        }
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_engram_db_open_creates_tables() {
        let path = ".engram/test_engram.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let conn = db.connection();
        let conn = conn.lock().unwrap();

        // Verify tables exist
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"memories".to_string()));
        assert!(tables.contains(&"conversation_turns".to_string()));
        assert!(tables.contains(&"prompt_templates".to_string()));

        drop(conn);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_schema_version_tracking() {
        let path = ".engram/test_engram_version.db";
        let _ = fs::remove_file(path);

        // Open twice - should not fail on second open
        let _db1 = EngramDb::open_at(path).unwrap();
        drop(_db1);

        let db2 = EngramDb::open_at(path).unwrap();
        let conn = db2.connection();
        let conn = conn.lock().unwrap();

        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();

        assert_eq!(version, SCHEMA_VERSION);

        drop(conn);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_prompt_seeding() {
        let path = ".engram/test_prompts.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();

        // First seed should insert all defaults
        let count = db.seed_prompts().unwrap();
        assert!(count > 0, "Should seed default prompts");

        // Second seed should be no-op
        let count2 = db.seed_prompts().unwrap();
        assert_eq!(count2, 0, "Should not re-seed");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_prompt_crud() {
        let path = ".engram/test_prompt_crud.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        db.seed_prompts().unwrap();

        // Read a prompt
        let content = db.get_prompt("responder").unwrap();
        assert!(!content.is_empty(), "Should contain prompt content");

        // Update a prompt (version should increment)
        let new_version = db.set_prompt("responder", "New responder prompt v2").unwrap();
        assert_eq!(new_version, 2, "Version should increment");

        // Read updated
        let (content, version) = db.get_prompt_versioned("responder").unwrap();
        assert_eq!(content, "New responder prompt v2");
        assert_eq!(version, 2);

        let _ = fs::remove_file(path);
    }
}
