//! # Exchange Coordinator
//!
//! Runs one question through the agent pipeline: recall context, answer,
//! analyze for retention, confirm, and conditionally persist the memory
//! row. Emits events along the way for the SSE stream.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::ExchangeError;
use crate::memory::{EngramMemory, MemoryConfig, MemoryRecord, MemoryStore};
use crate::models::{LlmProvider, ModelConfig};
use crate::skills::{prompts, AnalystSkill, ConfirmerSkill, ResponderSkill};
use crate::state::EngramDb;

use super::events::{new_id, ExchangeEvent, ExchangeEventKind};

/// Configuration for the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Global LLM provider (default: Anthropic)
    #[serde(default)]
    pub global_provider: LlmProvider,
    /// Global model to use for all agents
    pub global_model: Option<String>,
    /// Base URL override for LLM API (for OpenAI-compatible endpoints)
    pub base_url: Option<String>,
    /// Per-agent model overrides (agent_id -> model name)
    #[serde(default)]
    pub per_agent_models: HashMap<String, String>,
    /// Per-agent provider overrides (agent_id -> provider)
    #[serde(default)]
    pub per_agent_providers: HashMap<String, LlmProvider>,
    /// Per-agent base URL overrides (agent_id -> base_url, for OpenAI)
    #[serde(default)]
    pub per_agent_base_urls: HashMap<String, String>,
    /// Maximum recalled fragments inlined into the responder prompt
    pub recall_limit: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            global_provider: LlmProvider::Anthropic,
            global_model: None,
            base_url: None,
            per_agent_models: HashMap::new(),
            per_agent_providers: HashMap::new(),
            per_agent_base_urls: HashMap::new(),
            recall_limit: 5,
        }
    }
}

/// Result of running one exchange
#[derive(Debug)]
pub struct ExchangeOutcome {
    /// Exchange id shared by all events of this run
    pub exchange_id: String,
    /// The answer returned to the caller
    pub response: String,
    /// Analyst assessment, if the retention pass ran
    pub analysis: Option<String>,
    /// Confirmer verdict, if reached
    pub confirmation: Option<String>,
    /// The persisted row, if the verdict was affirmative
    pub memory: Option<MemoryRecord>,
}

impl ExchangeOutcome {
    /// Whether the exchange was persisted as a long-term memory
    pub fn remembered(&self) -> bool {
        self.memory.is_some()
    }
}

/// The exchange coordinator
pub struct Coordinator {
    config: CoordinatorConfig,
    db: Arc<EngramDb>,
    memory: EngramMemory,
    store: MemoryStore,
    events: Vec<ExchangeEvent>,
    event_tx: Option<mpsc::Sender<ExchangeEvent>>,
}

impl Coordinator {
    /// Create a new coordinator with an EngramDb
    pub fn new(config: CoordinatorConfig, db: Arc<EngramDb>) -> Self {
        let memory = EngramMemory::new_with_db(
            &db,
            MemoryConfig {
                max_results: config.recall_limit,
                ..MemoryConfig::default()
            },
        );
        let store = MemoryStore::new(&db);
        Self {
            config,
            db,
            memory,
            store,
            events: Vec::new(),
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<ExchangeEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Events recorded so far
    pub fn events(&self) -> &[ExchangeEvent] {
        &self.events
    }

    /// Get model config for a specific agent
    fn get_model_config(&self, agent_id: &str) -> ModelConfig {
        // Get provider: per-agent override -> global -> default
        let provider = self
            .config
            .per_agent_providers
            .get(agent_id)
            .cloned()
            .unwrap_or_else(|| self.config.global_provider.clone());

        // Get model: per-agent override -> global -> default for provider
        let model = self
            .config
            .per_agent_models
            .get(agent_id)
            .or(self.config.global_model.as_ref())
            .cloned()
            .unwrap_or_else(|| provider.default_model().to_string());

        // Get base_url: per-agent override -> global (only for OpenAI)
        let base_url = if provider.supports_base_url() {
            self.config
                .per_agent_base_urls
                .get(agent_id)
                .or(self.config.base_url.as_ref())
                .cloned()
        } else {
            None
        };

        ModelConfig {
            provider,
            model,
            base_url,
        }
    }

    /// System prompt for an agent: database copy, compiled default as fallback
    fn system_prompt(&self, slug: &str) -> String {
        match self.db.get_prompt(slug) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!("Prompt '{}' not in database, using compiled default", slug);
                prompts::all_defaults()
                    .into_iter()
                    .find(|(s, _)| *s == slug)
                    .map(|(_, content)| content.to_string())
                    .unwrap_or_default()
            }
        }
    }

    /// Emit an event
    async fn emit(&mut self, event: ExchangeEvent) {
        self.events.push(event.clone());
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run one exchange: answer the question and decide retention.
    ///
    /// A responder failure fails the whole call - there is nothing to
    /// return. Failures after the answer exists (analysis, confirmation,
    /// insert) are logged and the answer is returned with no memory row.
    pub async fn ask(&mut self, question: &str) -> Result<ExchangeOutcome> {
        let exchange_id = new_id();

        self.emit(
            ExchangeEvent::new(ExchangeEventKind::ExchangeStarted, "coordinator")
                .with_exchange(&exchange_id)
                .with_data(serde_json::json!({ "question": question })),
        )
        .await;

        // Recall context. A recall failure degrades to an empty context.
        let fragments = match self.memory.recall(question).await {
            Ok(fragments) => fragments,
            Err(e) => {
                tracing::warn!("Recall failed, answering without context: {}", e);
                Vec::new()
            }
        };
        let context = fragments.join("\n\n");

        // Agent 1: answer
        self.emit(
            ExchangeEvent::new(ExchangeEventKind::AgentStarted, "responder")
                .with_exchange(&exchange_id),
        )
        .await;

        let responder_prompt = self.system_prompt("responder");
        let responder_config = self.get_model_config("responder");
        let response =
            match ResponderSkill::run_with_prompt(&responder_prompt, question, &context, &responder_config)
                .await
            {
                Ok(output) => {
                    self.emit(
                        ExchangeEvent::new(ExchangeEventKind::AgentCompleted, "responder")
                            .with_exchange(&exchange_id),
                    )
                    .await;
                    output.response
                }
                Err(e) => {
                    self.emit(
                        ExchangeEvent::new(ExchangeEventKind::AgentFailed, "responder")
                            .with_exchange(&exchange_id)
                            .with_data(serde_json::json!({ "error": e.to_string() })),
                    )
                    .await;
                    self.emit(
                        ExchangeEvent::new(ExchangeEventKind::ExchangeFailed, "coordinator")
                            .with_exchange(&exchange_id),
                    )
                    .await;
                    return Err(ExchangeError::Respond(e.to_string()).into());
                }
            };

        // Record both turns. Bookkeeping only; the answer already exists.
        if let Err(e) = self
            .memory
            .record_turn(&exchange_id, &format!("{}:human", exchange_id), "human", question)
            .await
        {
            tracing::warn!("Failed to record human turn: {}", e);
        }
        if let Err(e) = self
            .memory
            .record_turn(&exchange_id, &format!("{}:ai", exchange_id), "ai", &response)
            .await
        {
            tracing::warn!("Failed to record ai turn: {}", e);
        }

        // Agents 2+3: decide retention
        let (analysis, confirmation, memory) = match self
            .retention_pass(&exchange_id, question, &response)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Retention pass failed, answer preserved: {}", e);
                (None, None, None)
            }
        };

        self.emit(
            ExchangeEvent::new(ExchangeEventKind::ExchangeCompleted, "coordinator")
                .with_exchange(&exchange_id)
                .with_data(serde_json::json!({ "remembered": memory.is_some() })),
        )
        .await;

        Ok(ExchangeOutcome {
            exchange_id,
            response,
            analysis,
            confirmation,
            memory,
        })
    }

    /// Analyze the exchange and, on an affirmative verdict, persist it.
    async fn retention_pass(
        &mut self,
        exchange_id: &str,
        question: &str,
        response: &str,
    ) -> Result<(Option<String>, Option<String>, Option<MemoryRecord>), ExchangeError> {
        self.emit(
            ExchangeEvent::new(ExchangeEventKind::AgentStarted, "analyst")
                .with_exchange(exchange_id),
        )
        .await;

        let analyst_prompt = self.system_prompt("analyst");
        let analyst_config = self.get_model_config("analyst");
        let analysis =
            match AnalystSkill::run_with_prompt(&analyst_prompt, question, response, &analyst_config)
                .await
            {
                Ok(output) => output.analysis,
                Err(e) => {
                    self.emit(
                        ExchangeEvent::new(ExchangeEventKind::AgentFailed, "analyst")
                            .with_exchange(exchange_id)
                            .with_data(serde_json::json!({ "error": e.to_string() })),
                    )
                    .await;
                    return Err(ExchangeError::Retention(e.to_string()));
                }
            };

        self.emit(
            ExchangeEvent::new(ExchangeEventKind::AgentCompleted, "analyst")
                .with_exchange(exchange_id),
        )
        .await;

        // An empty assessment means nothing to confirm
        if analysis.trim().is_empty() {
            self.emit(
                ExchangeEvent::new(ExchangeEventKind::MemorySkipped, "analyst")
                    .with_exchange(exchange_id)
                    .with_data(serde_json::json!({ "reason": "empty analysis" })),
            )
            .await;
            return Ok((Some(analysis), None, None));
        }

        self.emit(
            ExchangeEvent::new(ExchangeEventKind::AgentStarted, "confirmer")
                .with_exchange(exchange_id),
        )
        .await;

        let confirmer_prompt = self.system_prompt("confirmer");
        let confirmer_config = self.get_model_config("confirmer");
        let verdict = match ConfirmerSkill::run_with_prompt(&confirmer_prompt, &analysis, &confirmer_config)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                self.emit(
                    ExchangeEvent::new(ExchangeEventKind::AgentFailed, "confirmer")
                        .with_exchange(exchange_id)
                        .with_data(serde_json::json!({ "error": e.to_string() })),
                )
                .await;
                return Err(ExchangeError::Retention(e.to_string()));
            }
        };

        self.emit(
            ExchangeEvent::new(ExchangeEventKind::AgentCompleted, "confirmer")
                .with_exchange(exchange_id),
        )
        .await;

        if verdict.is_affirmative() {
            let record = self
                .store
                .insert(question, response, true)
                .map_err(|e| ExchangeError::Store(e.to_string()))?;

            self.emit(
                ExchangeEvent::new(ExchangeEventKind::MemorySaved, "confirmer")
                    .with_exchange(exchange_id)
                    .with_data(serde_json::json!({ "memory_id": record.id })),
            )
            .await;

            Ok((Some(analysis), Some(verdict.verdict), Some(record)))
        } else {
            self.emit(
                ExchangeEvent::new(ExchangeEventKind::MemorySkipped, "confirmer")
                    .with_exchange(exchange_id)
                    .with_data(serde_json::json!({ "verdict": verdict.verdict })),
            )
            .await;

            Ok((Some(analysis), Some(verdict.verdict), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_db(path: &str) -> Arc<EngramDb> {
        let _ = fs::remove_file(path);
        Arc::new(EngramDb::open_at(path).unwrap())
    }

    #[test]
    fn test_config_default() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.global_provider, LlmProvider::Anthropic);
        assert!(config.global_model.is_none());
        assert_eq!(config.recall_limit, 5);
    }

    #[test]
    fn test_model_config_precedence() {
        let path = ".engram/test_coordinator_models.db";
        let db = test_db(path);

        let mut config = CoordinatorConfig {
            global_model: Some("global-model".to_string()),
            ..CoordinatorConfig::default()
        };
        config
            .per_agent_models
            .insert("analyst".to_string(), "analyst-model".to_string());
        config
            .per_agent_providers
            .insert("confirmer".to_string(), LlmProvider::DeepSeek);

        let coordinator = Coordinator::new(config, Arc::clone(&db));

        // Per-agent model override wins
        assert_eq!(coordinator.get_model_config("analyst").model, "analyst-model");
        // Global model applies elsewhere
        assert_eq!(coordinator.get_model_config("responder").model, "global-model");
        // Per-agent provider override wins, model falls back to global
        let confirmer = coordinator.get_model_config("confirmer");
        assert_eq!(confirmer.provider, LlmProvider::DeepSeek);
        assert_eq!(confirmer.model, "global-model");

        drop(coordinator);
        drop(db);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_model_config_provider_default() {
        let path = ".engram/test_coordinator_defaults.db";
        let db = test_db(path);

        let coordinator = Coordinator::new(CoordinatorConfig::default(), Arc::clone(&db));
        let config = coordinator.get_model_config("responder");
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert_eq!(config.model, LlmProvider::Anthropic.default_model());
        assert!(coordinator.events().is_empty());

        drop(coordinator);
        drop(db);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_system_prompt_prefers_database_copy() {
        let path = ".engram/test_coordinator_prompts.db";
        let db = test_db(path);
        db.seed_prompts().unwrap();
        db.set_prompt("responder", "custom responder prompt").unwrap();

        let coordinator = Coordinator::new(CoordinatorConfig::default(), Arc::clone(&db));
        assert_eq!(coordinator.system_prompt("responder"), "custom responder prompt");

        // Unseeded slug falls back to the compiled default
        let fallback = {
            let db2 = test_db(".engram/test_coordinator_prompts2.db");
            let c2 = Coordinator::new(CoordinatorConfig::default(), Arc::clone(&db2));
            let p = c2.system_prompt("analyst");
            drop(c2);
            drop(db2);
            let _ = fs::remove_file(".engram/test_coordinator_prompts2.db");
            p
        };
        assert!(!fallback.is_empty());

        drop(coordinator);
        drop(db);
        let _ = fs::remove_file(path);
    }
}
