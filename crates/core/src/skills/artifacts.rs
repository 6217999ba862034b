//! # A2A Artifact Types
//!
//! Shared artifact types returned by the Engram skills.
//! Serialized to JSON and attached to `OnRequestResult::Completed` so
//! A2A clients can consume skill output without parsing prose.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Artifact from ResponderSkill containing the answer
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseArtifact {
    pub response: String,
    /// Number of recalled fragments the answer was grounded on
    pub context_fragments: usize,
}

/// Artifact from AnalystSkill containing the retention assessment
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisArtifact {
    pub analysis: String,
}

/// Artifact from ConfirmerSkill containing the retention verdict
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerdictArtifact {
    pub verdict: String,
    /// Whether the verdict text reads as an affirmative
    pub affirmative: bool,
}
