//! # Engram Core
//!
//! The "Brain" of the Engram system - agent skills, the exchange
//! pipeline, and memory persistence.
//!
//! ## Architecture
//!
//! - `skills/` - A2A-native skills (ResponderSkill, AnalystSkill, ConfirmerSkill)
//! - `models` - Centralized LLM provider configuration
//! - `memory/` - Persisted memories and the recall context built from them
//! - `state/` - Unified SQLite database
//! - `exchange/` - Pipeline coordination for one exchange
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engram_core::exchange::{Coordinator, CoordinatorConfig};
//! use engram_core::state::EngramDb;
//! use std::sync::Arc;
//!
//! let db = Arc::new(EngramDb::open()?);
//! let mut coordinator = Coordinator::new(CoordinatorConfig::default(), db);
//! let outcome = coordinator.ask("What is the capital of France?").await?;
//! println!("{} (remembered: {})", outcome.response, outcome.remembered());
//! ```

pub mod error;
pub mod exchange;
pub mod memory;
pub mod models;
pub mod skills;
pub mod state;
