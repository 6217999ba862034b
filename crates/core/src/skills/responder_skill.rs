//! # Responder Skill
//!
//! First agent of the exchange. Answers the human's question from the
//! recalled context, admitting ignorance when the context does not hold
//! the answer.

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::artifacts::ResponseArtifact;
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

/// Output from the responder skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ResponderOutput {
    /// The assistant's reply to the human
    pub response: String,
}

/// Responder skill for answering questions from recalled context
#[skill(
    id = "respond",
    name = "Respond",
    description = "Answers the human's question using only the recalled relevant information.",
    tags = ["conversation", "answer"],
    examples = ["What is the capital of France?"],
    input_modes = ["text/plain", "application/json"],
    output_modes = ["application/json"]
)]
pub struct ResponderSkill {
    config: ModelConfig,
}

impl ResponderSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn with_model(model: &str) -> Self {
        Self::new(ModelConfig::new(model))
    }

    /// Build the user-turn input from recalled context and the question
    pub fn build_input(question: &str, context: &str) -> String {
        format!(
            "Relevant information:\n{}\n\nHuman: {}",
            if context.trim().is_empty() {
                "(none)"
            } else {
                context
            },
            question
        )
    }

    /// SDK-style call for direct Coordinator integration.
    pub async fn run(
        question: &str,
        context: &str,
        config: &ModelConfig,
    ) -> anyhow::Result<ResponderOutput> {
        Self::run_with_prompt(SYSTEM_PROMPT, question, context, config).await
    }

    /// Run with a caller-supplied system prompt (e.g. the database copy)
    pub async fn run_with_prompt(
        system_prompt: &str,
        question: &str,
        context: &str,
        config: &ModelConfig,
    ) -> anyhow::Result<ResponderOutput> {
        let input = Self::build_input(question, context);
        run_llm_function!(config, ResponderOutput, system_prompt, input)
    }
}

#[async_trait]
impl SkillHandler for ResponderSkill {
    async fn on_request(
        &self,
        _state: &mut State,
        progress: &ProgressSender,
        _runtime: &dyn AgentRuntime,
        content: Content,
    ) -> AgentResult<OnRequestResult> {
        let input = content.first_text().unwrap_or_default();

        progress.send_update("Answering question...").await?;

        let result = run_llm_function!(&self.config, ResponderOutput, SYSTEM_PROMPT, input)
            .map_err(|e| AgentError::Internal {
                component: "responder_skill".to_string(),
                reason: e.to_string(),
            })?;

        progress.send_update("Answer ready.").await?;

        let artifact_data = ResponseArtifact {
            response: result.response.clone(),
            context_fragments: 0, // raw A2A requests carry context inline
        };

        let artifact =
            Artifact::from_json("response.json", &artifact_data).map_err(|e| {
                AgentError::Internal {
                    component: "responder_skill".to_string(),
                    reason: format!("Failed to create artifact: {}", e),
                }
            })?;

        Ok(OnRequestResult::Completed {
            message: Some(Content::from_text(&result.response)),
            artifacts: vec![artifact],
        })
    }
}

const SYSTEM_PROMPT: &str = prompts::RESPONDER;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_input_with_context() {
        let input = ResponderSkill::build_input("Where am I?", "Q: home?\nA: yes");
        assert!(input.starts_with("Relevant information:"));
        assert!(input.contains("Q: home?"));
        assert!(input.ends_with("Human: Where am I?"));
    }

    #[test]
    fn test_build_input_without_context() {
        let input = ResponderSkill::build_input("Where am I?", "  ");
        assert!(input.contains("(none)"));
    }
}
