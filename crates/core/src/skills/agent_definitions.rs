//! # A2A Agent Definitions
//!
//! Composes Engram agents from skills using radkit's Agent::builder().
//! Each agent can run as an A2A server exposing its skill.

use crate::models::ModelConfig;
use radkit::agent::{Agent, AgentDefinition};

use crate::skills::{AnalystSkill, ConfirmerSkill, ResponderSkill};

/// The Responder Agent
///
/// First agent in the exchange. Answers the human's question from
/// recalled context.
pub fn responder_agent(config: ModelConfig) -> AgentDefinition {
    Agent::builder()
        .with_name("Responder")
        .with_description(
            "Answers the human's question using only recalled relevant information, \
             admitting ignorance when the context does not hold the answer.",
        )
        .with_skill(ResponderSkill::new(config))
        .build()
}

/// The Analyst Agent
///
/// Second agent. Assesses whether the exchange holds durable facts.
pub fn analyst_agent(config: ModelConfig) -> AgentDefinition {
    Agent::builder()
        .with_name("Analyst")
        .with_description(
            "Reviews a question/response exchange and assesses whether it contains \
             anything worth remembering for future conversations.",
        )
        .with_skill(AnalystSkill::new(config))
        .build()
}

/// The Confirmer Agent
///
/// Third agent. Makes the final retention call.
pub fn confirmer_agent(config: ModelConfig) -> AgentDefinition {
    Agent::builder()
        .with_name("Confirmer")
        .with_description(
            "Confirms whether an analyzed exchange should be saved as a long-term \
             memory. Answers with a yes/no verdict.",
        )
        .with_skill(ConfirmerSkill::new(config))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agents_build() {
        // Construction must not touch the network or the environment
        let _ = responder_agent(ModelConfig::default());
        let _ = analyst_agent(ModelConfig::default());
        let _ = confirmer_agent(ModelConfig::default());
    }
}
