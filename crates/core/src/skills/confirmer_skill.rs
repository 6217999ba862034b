//! # Confirmer Skill
//!
//! Third agent of the exchange. Takes the analyst's assessment and makes
//! the final call on saving the memory. The verdict text gates the
//! insert: an affirmative ("yes" anywhere in the text, any case) saves
//! the exchange with the long-term flag set.

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::artifacts::VerdictArtifact;
use crate::skills::prompts;
use async_trait::async_trait;
use radkit::agent::{Artifact, OnRequestResult, SkillHandler};
use radkit::errors::{AgentError, AgentResult};
use radkit::macros::{skill, LLMOutput};
use radkit::models::Content;
use radkit::runtime::context::{ProgressSender, State};
use radkit::runtime::AgentRuntime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the confirmer skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ConfirmerOutput {
    /// Verdict text; begins with "yes" or "no"
    pub verdict: String,
}

impl ConfirmerOutput {
    /// Whether the verdict reads as an affirmative
    pub fn is_affirmative(&self) -> bool {
        self.verdict.to_lowercase().contains("yes")
    }
}

/// Confirmer skill making the final retention call
#[skill(
    id = "confirm",
    name = "Confirm",
    description = "Confirms whether an analyzed exchange should be saved as a long-term memory.",
    tags = ["memory", "verdict"],
    examples = ["Is this a valid memory?"],
    input_modes = ["text/plain", "application/json"],
    output_modes = ["application/json"]
)]
pub struct ConfirmerSkill {
    config: ModelConfig,
}

impl ConfirmerSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn with_model(model: &str) -> Self {
        Self::new(ModelConfig::new(model))
    }

    /// Build the user-turn input from the analyst's assessment
    pub fn build_input(analysis: &str) -> String {
        format!("Analysis: {}\nIs this a valid memory?", analysis)
    }

    /// SDK-style call for direct Coordinator integration.
    pub async fn run(analysis: &str, config: &ModelConfig) -> anyhow::Result<ConfirmerOutput> {
        Self::run_with_prompt(SYSTEM_PROMPT, analysis, config).await
    }

    /// Run with a caller-supplied system prompt (e.g. the database copy)
    pub async fn run_with_prompt(
        system_prompt: &str,
        analysis: &str,
        config: &ModelConfig,
    ) -> anyhow::Result<ConfirmerOutput> {
        let input = Self::build_input(analysis);
        run_llm_function!(config, ConfirmerOutput, system_prompt, input)
    }
}

#[async_trait]
impl SkillHandler for ConfirmerSkill {
    async fn on_request(
        &self,
        _state: &mut State,
        progress: &ProgressSender,
        _runtime: &dyn AgentRuntime,
        content: Content,
    ) -> AgentResult<OnRequestResult> {
        let input = content.first_text().unwrap_or_default();

        progress.send_update("Confirming memory...").await?;

        let result = run_llm_function!(&self.config, ConfirmerOutput, SYSTEM_PROMPT, input)
            .map_err(|e| AgentError::Internal {
                component: "confirmer_skill".to_string(),
                reason: e.to_string(),
            })?;

        progress.send_update("Verdict ready.").await?;

        let artifact_data = VerdictArtifact {
            verdict: result.verdict.clone(),
            affirmative: result.is_affirmative(),
        };

        let artifact =
            Artifact::from_json("verdict.json", &artifact_data).map_err(|e| {
                AgentError::Internal {
                    component: "confirmer_skill".to_string(),
                    reason: format!("Failed to create artifact: {}", e),
                }
            })?;

        Ok(OnRequestResult::Completed {
            message: Some(Content::from_text(&result.verdict)),
            artifacts: vec![artifact],
        })
    }
}

const SYSTEM_PROMPT: &str = prompts::CONFIRMER;

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(text: &str) -> ConfirmerOutput {
        ConfirmerOutput {
            verdict: text.to_string(),
        }
    }

    #[test]
    fn test_affirmative_verdicts() {
        assert!(verdict("yes").is_affirmative());
        assert!(verdict("Yes, the name is a durable fact.").is_affirmative());
        assert!(verdict("YES").is_affirmative());
        // Substring match by design: any "yes" in the text counts
        assert!(verdict("I would say yes").is_affirmative());
    }

    #[test]
    fn test_negative_verdicts() {
        assert!(!verdict("no").is_affirmative());
        assert!(!verdict("No, this is small talk.").is_affirmative());
        assert!(!verdict("").is_affirmative());
    }

    #[test]
    fn test_build_input_shape() {
        let input = ConfirmerSkill::build_input("Names two facts.");
        assert!(input.starts_with("Analysis: Names two facts."));
        assert!(input.ends_with("Is this a valid memory?"));
    }
}
