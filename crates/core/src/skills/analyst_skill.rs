//! # Analyst Skill
//!
//! Second agent of the exchange. Reviews the question/response pair and
//! writes a free-text assessment of whether it holds anything worth
//! remembering. The assessment feeds the confirmer, which makes the
//! final call.

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::artifacts::AnalysisArtifact;
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

/// Output from the analyst skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct AnalystOutput {
    /// Free-text assessment of the exchange's retention value
    pub analysis: String,
}

/// Analyst skill for judging whether an exchange holds durable facts
#[skill(
    id = "analyze",
    name = "Analyze",
    description = "Reviews a question/response exchange and assesses whether it is worth remembering.",
    tags = ["memory", "analysis"],
    examples = ["Should this exchange be remembered?"],
    input_modes = ["text/plain", "application/json"],
    output_modes = ["application/json"]
)]
pub struct AnalystSkill {
    config: ModelConfig,
}

impl AnalystSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn with_model(model: &str) -> Self {
        Self::new(ModelConfig::new(model))
    }

    /// Build the user-turn input from the exchange under review
    pub fn build_input(question: &str, response: &str) -> String {
        format!(
            "Question: {}\nResponse: {}\nShould this be remembered?",
            question, response
        )
    }

    /// SDK-style call for direct Coordinator integration.
    pub async fn run(
        question: &str,
        response: &str,
        config: &ModelConfig,
    ) -> anyhow::Result<AnalystOutput> {
        Self::run_with_prompt(SYSTEM_PROMPT, question, response, config).await
    }

    /// Run with a caller-supplied system prompt (e.g. the database copy)
    pub async fn run_with_prompt(
        system_prompt: &str,
        question: &str,
        response: &str,
        config: &ModelConfig,
    ) -> anyhow::Result<AnalystOutput> {
        let input = Self::build_input(question, response);
        run_llm_function!(config, AnalystOutput, system_prompt, input)
    }
}

#[async_trait]
impl SkillHandler for AnalystSkill {
    async fn on_request(
        &self,
        _state: &mut State,
        progress: &ProgressSender,
        _runtime: &dyn AgentRuntime,
        content: Content,
    ) -> AgentResult<OnRequestResult> {
        let input = content.first_text().unwrap_or_default();

        progress.send_update("Analyzing exchange...").await?;

        let result = run_llm_function!(&self.config, AnalystOutput, SYSTEM_PROMPT, input)
            .map_err(|e| AgentError::Internal {
                component: "analyst_skill".to_string(),
                reason: e.to_string(),
            })?;

        progress.send_update("Analysis complete.").await?;

        let artifact_data = AnalysisArtifact {
            analysis: result.analysis.clone(),
        };

        let artifact =
            Artifact::from_json("analysis.json", &artifact_data).map_err(|e| {
                AgentError::Internal {
                    component: "analyst_skill".to_string(),
                    reason: format!("Failed to create artifact: {}", e),
                }
            })?;

        Ok(OnRequestResult::Completed {
            message: Some(Content::from_text(&result.analysis)),
            artifacts: vec![artifact],
        })
    }
}

const SYSTEM_PROMPT: &str = prompts::ANALYST;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_input_shape() {
        let input = AnalystSkill::build_input("Who am I?", "You are Ada.");
        assert!(input.starts_with("Question: Who am I?"));
        assert!(input.contains("Response: You are Ada."));
        assert!(input.ends_with("Should this be remembered?"));
    }
}
