//! # Memory
//!
//! Persisted memories and the recall context built from them.

pub mod recall;
pub mod store;

pub use recall::{EngramMemory, MemoryConfig, MemoryProvider};
pub use store::{MemoryRecord, MemoryStore};
