//! # Exchange Events
//!
//! Event types emitted while an exchange moves through the agent pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of exchange event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeEventKind {
    /// Exchange started
    ExchangeStarted,
    /// Agent started working
    AgentStarted,
    /// Agent completed successfully
    AgentCompleted,
    /// Agent failed
    AgentFailed,
    /// Memory row persisted with the long-term flag
    MemorySaved,
    /// Exchange judged not worth keeping
    MemorySkipped,
    /// Exchange completed
    ExchangeCompleted,
    /// Exchange failed before an answer existed
    ExchangeFailed,
}

/// An event in the exchange pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: ExchangeEventKind,
    /// Agent that produced this event
    pub agent: String,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Exchange this event belongs to
    #[serde(default)]
    pub exchange_id: Option<String>,
}

impl ExchangeEvent {
    /// Create a new event
    pub fn new(kind: ExchangeEventKind, agent: &str) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            kind,
            agent: agent.to_string(),
            data: None,
            exchange_id: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add the owning exchange ID
    pub fn with_exchange(mut self, exchange_id: &str) -> Self {
        self.exchange_id = Some(exchange_id.to_string());
        self
    }
}

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a simple unique id (also used for exchange ids)
///
/// Millisecond timestamp plus a process-wide sequence number. Readable
/// in logs and unique within a process; not a UUID.
pub fn new_id() -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:04x}", Utc::now().format("%Y%m%d%H%M%S%3f"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = ExchangeEvent::new(ExchangeEventKind::AgentStarted, "responder")
            .with_exchange("exch-001");

        assert_eq!(event.agent, "responder");
        assert_eq!(event.exchange_id, Some("exch-001".to_string()));
        assert!(event.data.is_none());
    }

    #[test]
    fn test_event_data() {
        let event = ExchangeEvent::new(ExchangeEventKind::MemorySaved, "confirmer")
            .with_data(serde_json::json!({"memory_id": 7}));

        assert_eq!(event.data.unwrap()["memory_id"], 7);
    }

    #[test]
    fn test_ids_are_distinct() {
        assert_ne!(new_id(), new_id());
    }
}
