//! # Exchange Orchestration
//!
//! Coordinates the agent pipeline for one exchange.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Question → Recall → Responder → Analyst → Confirmer → (Memory row)
//! ```

pub mod coordinator;
pub mod events;

pub use coordinator::{Coordinator, CoordinatorConfig, ExchangeOutcome};
pub use events::{ExchangeEvent, ExchangeEventKind};
