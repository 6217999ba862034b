//! # Engram Skills
//!
//! A2A-native skills for the Engram exchange.
//!
//! ## Architecture
//!
//! ```text
//! Agent (A2A server)
//!   └── Skills (#[skill] + SkillHandler)
//! ```
//!
//! One skill per agent of the exchange:
//! - `ResponderSkill` - Answer the question from recalled context
//! - `AnalystSkill` - Assess whether the exchange is worth remembering
//! - `ConfirmerSkill` - Final yes/no call on saving the memory

pub mod llm_helpers;
pub mod prompts;

// Shared A2A artifact types
pub mod artifacts;

// Exchange skills
pub mod analyst_skill;
pub mod confirmer_skill;
pub mod responder_skill;

// Agent Definitions (compose skills into agents)
pub mod agent_definitions;

// Re-exports for convenience
pub use analyst_skill::AnalystSkill;
pub use confirmer_skill::ConfirmerSkill;
pub use responder_skill::ResponderSkill;

// Agent factory functions
pub use agent_definitions::{analyst_agent, confirmer_agent, responder_agent};
