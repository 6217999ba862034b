//! # Engram Recall
//!
//! Wrapper around memory backends used to build the "Relevant information"
//! context for the responder prompt. Supports radkit's InMemory service
//! (non-persistent) and the SQLite store (persistent).

use anyhow::Result;
use radkit::runtime::context::AuthContext;
use radkit::runtime::memory::{
    ContentSource, InMemoryMemoryService, MemoryContent, MemoryService, SearchOptions,
};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::state::db::EngramDb;

use super::store::MemoryStore;

/// Memory provider selection
#[derive(Debug, Clone, Default)]
pub enum MemoryProvider {
    /// In-memory (radkit default, non-persistent)
    InMemory,
    /// SQLite file-based (persistent)
    #[default]
    Sqlite,
}

/// Configuration for the recall service
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Application name for namespacing
    pub app_name: String,
    /// User name for namespacing
    pub user_name: String,
    /// Maximum recall results
    pub max_results: usize,
    /// Memory provider to use
    pub provider: MemoryProvider,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            app_name: "engram".to_string(),
            user_name: "default".to_string(),
            max_results: 5,
            provider: MemoryProvider::Sqlite,
        }
    }
}

/// Internal storage for memory backends
enum MemoryBackend {
    InMemory {
        service: Arc<InMemoryMemoryService>,
        auth: AuthContext,
    },
    Sqlite {
        store: MemoryStore,
        conn: Arc<Mutex<Connection>>,
    },
}

/// Recall service wrapper
pub struct EngramMemory {
    backend: MemoryBackend,
    config: MemoryConfig,
}

impl EngramMemory {
    /// Create a new recall instance with SQLite backend from EngramDb
    pub fn new_with_db(db: &EngramDb, config: MemoryConfig) -> Self {
        let backend = match config.provider {
            MemoryProvider::InMemory => Self::in_memory_backend(&config),
            MemoryProvider::Sqlite => MemoryBackend::Sqlite {
                store: MemoryStore::new(db),
                conn: db.connection(),
            },
        };

        Self { backend, config }
    }

    /// Create a new recall instance without a database (always in-memory)
    pub fn new(config: MemoryConfig) -> Self {
        if matches!(config.provider, MemoryProvider::Sqlite) {
            tracing::warn!("EngramMemory::new() with Sqlite requires EngramDb, falling back to InMemory");
        }
        let backend = Self::in_memory_backend(&config);
        Self { backend, config }
    }

    fn in_memory_backend(config: &MemoryConfig) -> MemoryBackend {
        MemoryBackend::InMemory {
            service: Arc::new(InMemoryMemoryService::new()),
            auth: AuthContext {
                app_name: config.app_name.clone(),
                user_name: config.user_name.clone(),
            },
        }
    }

    /// Search for context relevant to a question
    ///
    /// Returns plain text fragments ready to inline into a prompt.
    pub async fn recall(&self, query: &str) -> Result<Vec<String>> {
        match &self.backend {
            MemoryBackend::InMemory { service, auth } => {
                let options = SearchOptions::default().with_limit(self.config.max_results);
                let results = service.search(auth, query, options).await?;
                Ok(results.into_iter().map(|entry| entry.text).collect())
            }
            MemoryBackend::Sqlite { store, .. } => {
                let entries = store.search(query, self.config.max_results)?;
                Ok(entries
                    .into_iter()
                    .map(|m| format!("Q: {}\nA: {}", m.question, m.response))
                    .collect())
            }
        }
    }

    /// Record a conversation turn
    pub async fn record_turn(
        &self,
        exchange_id: &str,
        message_id: &str,
        role: &str,
        text: &str,
    ) -> Result<String> {
        match &self.backend {
            MemoryBackend::InMemory { service, auth } => {
                let content = MemoryContent {
                    text: text.to_string(),
                    source: ContentSource::PastConversation {
                        context_id: exchange_id.to_string(),
                        message_id: message_id.to_string(),
                        role: role.to_string(),
                    },
                    metadata: HashMap::new(),
                };
                let id = service.add(auth, content).await?;
                Ok(id)
            }
            MemoryBackend::Sqlite { conn, .. } => {
                let conn = conn
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
                conn.execute(
                    "INSERT INTO conversation_turns (exchange_id, role, text) VALUES (?1, ?2, ?3)",
                    params![exchange_id, role, text],
                )?;
                Ok(conn.last_insert_rowid().to_string())
            }
        }
    }

    /// Check if using persistent storage
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, MemoryBackend::Sqlite { .. })
    }

    /// Get memory count (SQLite only)
    pub fn count(&self) -> Result<i64> {
        match &self.backend {
            MemoryBackend::Sqlite { store, .. } => store.count(),
            MemoryBackend::InMemory { .. } => Ok(0), // InMemory doesn't expose count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_memory_config_default() {
        let config = MemoryConfig::default();
        assert_eq!(config.app_name, "engram");
        assert_eq!(config.max_results, 5);
        assert!(matches!(config.provider, MemoryProvider::Sqlite));
    }

    #[test]
    fn test_memory_provider_inmemory() {
        let config = MemoryConfig {
            provider: MemoryProvider::InMemory,
            ..Default::default()
        };
        let memory = EngramMemory::new(config);
        assert!(!memory.is_persistent());
    }

    #[tokio::test]
    async fn test_sqlite_recall_formats_pairs() {
        let path = ".engram/test_recall.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let store = MemoryStore::new(&db);
        store
            .insert("Where is Paris?", "Paris is in France.", true)
            .unwrap();

        let memory = EngramMemory::new_with_db(&db, MemoryConfig::default());
        assert!(memory.is_persistent());

        let fragments = memory.recall("Paris").await.unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].contains("Q: Where is Paris?"));
        assert!(fragments[0].contains("A: Paris is in France."));

        drop(db);
        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_record_turn_persists() {
        let path = ".engram/test_turns.db";
        let _ = fs::remove_file(path);

        let db = EngramDb::open_at(path).unwrap();
        let memory = EngramMemory::new_with_db(&db, MemoryConfig::default());

        let id = memory
            .record_turn("exch-1", "exch-1:human", "human", "hello")
            .await
            .unwrap();
        assert!(!id.is_empty());

        let conn = db.connection();
        let conn = conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM conversation_turns", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);

        drop(conn);
        let _ = fs::remove_file(path);
    }
}
