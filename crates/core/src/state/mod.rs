//! # State Management
//!
//! Persistent state for the Engram system, consolidated into a single
//! SQLite database.

pub mod db;

pub use db::EngramDb;
