//! Engram Server
//!
//! Axum server exposing the exchange pipeline and the memory store over
//! a versioned JSON API, with an SSE stream of pipeline events.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use engram_core::exchange::{Coordinator, CoordinatorConfig, ExchangeEvent};
use engram_core::memory::{MemoryRecord, MemoryStore};
use engram_core::models::LlmProvider;
use engram_core::state::EngramDb;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
};
use utoipa::{OpenApi, ToSchema};

/// Application state
struct AppState {
    /// Unified database for all state
    db: Arc<EngramDb>,
    /// Row-level access for the read endpoints
    store: MemoryStore,
    event_tx: broadcast::Sender<ExchangeEvent>,
}

type SharedState = Arc<AppState>;

// === API Types ===

#[derive(Deserialize, ToSchema)]
struct AskRequest {
    question: String,
    settings: Option<ApiSettings>,
}

#[derive(Deserialize, ToSchema)]
struct ApiSettings {
    global_provider: Option<String>,
    global_model: Option<String>,
    base_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct AskResponse {
    /// The answer to the question
    response: String,
    /// Whether the exchange was persisted as a long-term memory
    remembered: bool,
    /// Id of the persisted row, when remembered
    memory_id: Option<i64>,
    exchange_id: String,
}

#[derive(Serialize, ToSchema)]
struct ApiResponse {
    success: bool,
    message: String,
}

#[derive(Serialize, ToSchema)]
struct MemoryResponse {
    id: i64,
    question: String,
    response: String,
    long_term: bool,
    created_at: String,
}

impl From<MemoryRecord> for MemoryResponse {
    fn from(m: MemoryRecord) -> Self {
        Self {
            id: m.id,
            question: m.question,
            response: m.response,
            long_term: m.long_term,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct MemoryListResponse {
    memories: Vec<MemoryResponse>,
}

#[derive(Deserialize, ToSchema)]
struct MemorySearchRequest {
    query: String,
}

#[derive(Serialize, ToSchema)]
struct MemorySearchResponse {
    results: Vec<MemoryResponse>,
}

#[derive(Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

// === Prompt Template Types ===

#[derive(Serialize, ToSchema)]
struct PromptListItem {
    slug: String,
    version: i32,
}

#[derive(Serialize, ToSchema)]
struct PromptListResponse {
    prompts: Vec<PromptListItem>,
}

#[derive(Serialize, ToSchema)]
struct PromptResponse {
    slug: String,
    content: String,
    version: i32,
}

#[derive(Deserialize, ToSchema)]
struct UpdatePromptRequest {
    content: String,
}

#[derive(Serialize, ToSchema)]
struct UpdatePromptResponse {
    success: bool,
    slug: String,
    new_version: i32,
}

// === Config API Types ===

/// Persisted configuration (subset of CoordinatorConfig exposed to clients)
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
struct PersistedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    global_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    global_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recall_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    per_agent_providers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    per_agent_models: HashMap<String, String>,
}

impl PersistedConfig {
    async fn load() -> Self {
        let path = std::path::PathBuf::from(".engram/config.json");
        if path.exists() {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        }
    }

    async fn save(&self) -> Result<(), std::io::Error> {
        let path = std::path::PathBuf::from(".engram/config.json");
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&path, content).await
    }

    fn merge(&mut self, other: PersistedConfig) {
        if other.global_provider.is_some() {
            self.global_provider = other.global_provider;
        }
        if other.global_model.is_some() {
            self.global_model = other.global_model;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.recall_limit.is_some() {
            self.recall_limit = other.recall_limit;
        }
        for (k, v) in other.per_agent_providers {
            self.per_agent_providers.insert(k, v);
        }
        for (k, v) in other.per_agent_models {
            self.per_agent_models.insert(k, v);
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
struct ConfigResponse {
    config: PersistedConfig,
    defaults: ConfigDefaults,
}

#[derive(Debug, Serialize, ToSchema)]
struct ConfigDefaults {
    global_provider: &'static str,
    recall_limit: usize,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            global_provider: "anthropic",
            recall_limit: 5,
        }
    }
}

// === Provider API Types ===

#[derive(Debug, Serialize, ToSchema)]
struct ProviderInfo {
    id: String,
    name: String,
    default_model: String,
    supports_base_url: bool,
    env_var: String,
}

#[derive(Debug, Serialize, ToSchema)]
struct ProvidersResponse {
    providers: Vec<ProviderInfo>,
}

fn get_provider_info() -> Vec<ProviderInfo> {
    LlmProvider::all()
        .into_iter()
        .map(|p| ProviderInfo {
            id: serde_json::to_value(&p)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            name: p.display_name().to_string(),
            default_model: p.default_model().to_string(),
            supports_base_url: p.supports_base_url(),
            env_var: p.env_var().to_string(),
        })
        .collect()
}

/// Map a provider id string from the API to the enum
fn parse_provider(s: &str) -> Option<LlmProvider> {
    match s {
        "anthropic" => Some(LlmProvider::Anthropic),
        "openai" => Some(LlmProvider::OpenAI),
        "gemini" => Some(LlmProvider::Gemini),
        "openrouter" => Some(LlmProvider::OpenRouter),
        "grok" => Some(LlmProvider::Grok),
        "deepseek" => Some(LlmProvider::DeepSeek),
        _ => None,
    }
}

/// Build a coordinator config from persisted settings plus per-request overrides
fn build_coordinator_config(
    persisted: &PersistedConfig,
    settings: Option<&ApiSettings>,
) -> CoordinatorConfig {
    let mut config = CoordinatorConfig::default();

    if let Some(p) = persisted.global_provider.as_deref().and_then(parse_provider) {
        config.global_provider = p;
    }
    config.global_model = persisted.global_model.clone();
    config.base_url = persisted.base_url.clone();
    if let Some(limit) = persisted.recall_limit {
        config.recall_limit = limit;
    }
    for (agent, provider_str) in &persisted.per_agent_providers {
        if let Some(provider) = parse_provider(provider_str) {
            config.per_agent_providers.insert(agent.clone(), provider);
        }
    }
    config.per_agent_models = persisted.per_agent_models.clone();

    if let Some(settings) = settings {
        if let Some(p) = settings.global_provider.as_deref().and_then(parse_provider) {
            config.global_provider = p;
        }
        if let Some(m) = &settings.global_model {
            config.global_model = Some(m.clone());
        }
        if let Some(url) = &settings.base_url {
            config.base_url = Some(url.clone());
        }
    }

    config
}

#[derive(Parser, Clone)]
#[command(author, version, about = "Engram - Memory-Keeping Q&A Service")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the Engram server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Run one exchange from the command line (no server)
    Ask {
        /// The question to ask
        question: String,
    },
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Engram API",
        version = "1.0.0",
        description = "API for the Engram memory-keeping Q&A service"
    ),
    paths(
        ask,
        list_memories,
        get_memory,
        search_memories,
        get_config,
        update_config,
        get_providers,
        list_prompts,
        get_prompt,
        update_prompt
    ),
    components(
        schemas(
            AskRequest,
            ApiSettings,
            AskResponse,
            ApiResponse,
            MemoryResponse,
            MemoryListResponse,
            MemorySearchRequest,
            MemorySearchResponse,
            ConfigResponse,
            ConfigDefaults,
            PersistedConfig,
            ProvidersResponse,
            ProviderInfo,
            PromptListResponse,
            PromptListItem,
            PromptResponse,
            UpdatePromptRequest,
            UpdatePromptResponse
        )
    ),
    tags(
        (name = "exchange", description = "Ask questions through the agent pipeline"),
        (name = "memory", description = "Stored memories"),
        (name = "config", description = "Configuration management"),
        (name = "providers", description = "LLM provider discovery"),
        (name = "prompts", description = "Prompt template management")
    )
)]
struct ApiDoc;

// === API Handlers ===

/// Ask a question through the agent pipeline
#[utoipa::path(
    post,
    path = "/api/v1/ask",
    tag = "exchange",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer produced", body = AskResponse),
        (status = 422, description = "Empty question", body = ApiResponse),
        (status = 502, description = "Responder agent failed", body = ApiResponse)
    )
)]
async fn ask(
    State(state): State<SharedState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<ApiResponse>)> {
    if req.question.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse {
                success: false,
                message: "question must not be empty".to_string(),
            }),
        ));
    }

    let persisted = PersistedConfig::load().await;
    let config = build_coordinator_config(&persisted, req.settings.as_ref());

    // Bridge coordinator events to the broadcast channel
    let (event_tx, mut event_rx) = mpsc::channel::<ExchangeEvent>(64);
    let broadcast_tx = state.event_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let _ = broadcast_tx.send(event);
        }
    });

    let mut coordinator =
        Coordinator::new(config, Arc::clone(&state.db)).with_event_channel(event_tx);

    match coordinator.ask(&req.question).await {
        Ok(outcome) => {
            let remembered = outcome.remembered();
            Ok(Json(AskResponse {
                response: outcome.response,
                remembered,
                memory_id: outcome.memory.as_ref().map(|m| m.id),
                exchange_id: outcome.exchange_id,
            }))
        }
        Err(e) => {
            tracing::error!("Exchange failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse {
                    success: false,
                    message: e.to_string(),
                }),
            ))
        }
    }
}

/// List stored memories, newest first
#[utoipa::path(
    get,
    path = "/api/v1/memories",
    tag = "memory",
    responses(
        (status = 200, description = "Stored memories", body = MemoryListResponse)
    )
)]
async fn list_memories(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Json<MemoryListResponse> {
    let limit = params.limit.unwrap_or(50);
    match state.store.list(limit) {
        Ok(memories) => Json(MemoryListResponse {
            memories: memories.into_iter().map(MemoryResponse::from).collect(),
        }),
        Err(e) => {
            tracing::error!("Failed to list memories: {}", e);
            Json(MemoryListResponse { memories: vec![] })
        }
    }
}

/// Fetch one memory by id
#[utoipa::path(
    get,
    path = "/api/v1/memories/{id}",
    tag = "memory",
    params(("id" = i64, Path, description = "Memory id")),
    responses(
        (status = 200, description = "The memory", body = MemoryResponse),
        (status = 404, description = "No such memory")
    )
)]
async fn get_memory(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MemoryResponse>, StatusCode> {
    match state.store.get(id) {
        Ok(Some(memory)) => Ok(Json(MemoryResponse::from(memory))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to fetch memory {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Search memories by keyword
#[utoipa::path(
    post,
    path = "/api/v1/memories/search",
    tag = "memory",
    request_body = MemorySearchRequest,
    responses(
        (status = 200, description = "Search results", body = MemorySearchResponse)
    )
)]
async fn search_memories(
    State(state): State<SharedState>,
    Json(req): Json<MemorySearchRequest>,
) -> Json<MemorySearchResponse> {
    match state.store.search(&req.query, 20) {
        Ok(results) => Json(MemorySearchResponse {
            results: results.into_iter().map(MemoryResponse::from).collect(),
        }),
        Err(e) => {
            tracing::error!("Memory search failed: {}", e);
            Json(MemorySearchResponse { results: vec![] })
        }
    }
}

/// SSE endpoint for real-time events with heartbeat
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();

    // Use timeout-based stream with heartbeat every 15 seconds
    let stream = stream::unfold(rx, |mut rx| async move {
        let timeout = tokio::time::timeout(std::time::Duration::from_secs(15), rx.recv()).await;

        match timeout {
            Ok(Ok(event)) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Ok(Err(_)) => None, // Channel closed
            Err(_) => {
                // Timeout - send heartbeat comment
                Some((Ok(Event::default().comment("heartbeat")), rx))
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// === Config Handlers ===

/// Get current configuration
#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Current configuration and defaults", body = ConfigResponse)
    )
)]
async fn get_config() -> Json<ConfigResponse> {
    let config = PersistedConfig::load().await;
    Json(ConfigResponse {
        config,
        defaults: ConfigDefaults::default(),
    })
}

/// Update configuration (partial merge)
#[utoipa::path(
    patch,
    path = "/api/v1/config",
    tag = "config",
    request_body = PersistedConfig,
    responses(
        (status = 200, description = "Updated configuration", body = ConfigResponse)
    )
)]
async fn update_config(Json(updates): Json<PersistedConfig>) -> Json<ConfigResponse> {
    let mut config = PersistedConfig::load().await;
    config.merge(updates);

    if let Err(e) = config.save().await {
        tracing::error!("Failed to save config: {}", e);
    }

    Json(ConfigResponse {
        config,
        defaults: ConfigDefaults::default(),
    })
}

/// Get available LLM providers
#[utoipa::path(
    get,
    path = "/api/v1/providers",
    tag = "providers",
    responses(
        (status = 200, description = "List of supported LLM providers", body = ProvidersResponse)
    )
)]
async fn get_providers() -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: get_provider_info(),
    })
}

// === Prompt Template Handlers ===

/// List all prompts
#[utoipa::path(
    get,
    path = "/api/v1/prompts",
    tag = "prompts",
    responses(
        (status = 200, description = "List of prompts", body = PromptListResponse)
    )
)]
async fn list_prompts(State(state): State<SharedState>) -> Json<PromptListResponse> {
    match state.db.list_prompts() {
        Ok(prompts) => Json(PromptListResponse {
            prompts: prompts
                .into_iter()
                .map(|(slug, version)| PromptListItem { slug, version })
                .collect(),
        }),
        Err(_) => Json(PromptListResponse { prompts: vec![] }),
    }
}

/// Get a prompt by slug
#[utoipa::path(
    get,
    path = "/api/v1/prompts/{slug}",
    tag = "prompts",
    params(("slug" = String, Path, description = "Prompt slug")),
    responses(
        (status = 200, description = "Prompt content", body = PromptResponse)
    )
)]
async fn get_prompt(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Json<PromptResponse> {
    match state.db.get_prompt_versioned(&slug) {
        Ok((content, version)) => Json(PromptResponse {
            slug,
            content,
            version,
        }),
        Err(_) => Json(PromptResponse {
            slug,
            content: "".to_string(),
            version: 0,
        }),
    }
}

/// Update a prompt
#[utoipa::path(
    put,
    path = "/api/v1/prompts/{slug}",
    tag = "prompts",
    params(("slug" = String, Path, description = "Prompt slug")),
    request_body = UpdatePromptRequest,
    responses(
        (status = 200, description = "Prompt updated", body = UpdatePromptResponse)
    )
)]
async fn update_prompt(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdatePromptRequest>,
) -> Json<UpdatePromptResponse> {
    match state.db.set_prompt(&slug, &req.content) {
        Ok(new_version) => Json(UpdatePromptResponse {
            success: true,
            slug,
            new_version,
        }),
        Err(_) => Json(UpdatePromptResponse {
            success: false,
            slug,
            new_version: 0,
        }),
    }
}

// === OpenAPI Handler ===

async fn serve_openapi() -> impl IntoResponse {
    let spec = ApiDoc::openapi().to_json().unwrap_or_default();
    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(spec))
        .unwrap()
}

// === A2A Agent Card Handler ===

/// Serve the A2A agent card for agent discovery
/// Returns JSON conformant with the A2A protocol specification
async fn serve_agent_card() -> impl IntoResponse {
    let agent_card = serde_json::json!({
        "name": "Engram",
        "description": "Memory-keeping Q&A service: answers questions and retains the exchanges worth remembering.",
        "url": "http://localhost:8080",
        "provider": {
            "organization": "Engram",
            "url": "https://github.com/engram"
        },
        "version": "1.0.0",
        "capabilities": {
            "streaming": true,
            "pushNotifications": false,
            "stateTransitionHistory": false
        },
        "skills": [
            {
                "id": "respond",
                "name": "Respond",
                "description": "Answers the human's question using only recalled relevant information.",
                "tags": ["conversation", "answer"],
                "inputModes": ["text/plain", "application/json"],
                "outputModes": ["application/json"]
            },
            {
                "id": "analyze",
                "name": "Analyze",
                "description": "Reviews a question/response exchange and assesses whether it is worth remembering.",
                "tags": ["memory", "analysis"],
                "inputModes": ["text/plain", "application/json"],
                "outputModes": ["application/json"]
            },
            {
                "id": "confirm",
                "name": "Confirm",
                "description": "Confirms whether an analyzed exchange should be saved as a long-term memory.",
                "tags": ["memory", "verdict"],
                "inputModes": ["text/plain", "application/json"],
                "outputModes": ["application/json"]
            }
        ]
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(
            serde_json::to_string_pretty(&agent_card).unwrap_or_default(),
        ))
        .unwrap()
}

// === Server Entry ===

async fn run_server(port: u16) -> anyhow::Result<()> {
    let (event_tx, _) = broadcast::channel::<ExchangeEvent>(100);

    // Initialize the unified database
    let db = Arc::new(EngramDb::open().expect("Failed to open EngramDb"));

    // Seed default prompts
    match db.seed_prompts() {
        Ok(count) if count > 0 => tracing::info!("Seeded {} default prompts", count),
        Ok(_) => {} // Already seeded
        Err(e) => tracing::warn!("Failed to seed prompts: {}", e),
    }

    let store = MemoryStore::new(&db);

    let state: SharedState = Arc::new(AppState {
        db,
        store,
        event_tx,
    });

    let memory_routes = Router::new()
        .route("/", get(list_memories))
        .route("/search", post(search_memories))
        .route("/:id", get(get_memory));

    let prompt_routes = Router::new()
        .route("/", get(list_prompts))
        .route("/:slug", get(get_prompt).put(update_prompt));

    let app = Router::new()
        // v1 API routes
        .route("/api/v1/ask", post(ask))
        .nest("/api/v1/memories", memory_routes)
        .nest("/api/v1/prompts", prompt_routes)
        .route("/api/v1/events", get(events))
        .route("/api/v1/config", get(get_config).patch(update_config))
        .route("/api/v1/providers", get(get_providers))
        .route("/api/v1/openapi.json", get(serve_openapi))
        // A2A Discovery endpoint
        .route("/.well-known/agent-card.json", get(serve_agent_card))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Engram server running at http://{}", addr);
    println!("   Ask:       POST /api/v1/ask");
    println!("   Memories:  /api/v1/memories, /search, /{{id}}");
    println!("   Events:    /api/v1/events (SSE)");
    println!("   Config:    /api/v1/config (GET, PATCH)");
    println!("   Providers: /api/v1/providers (GET)");
    println!("   Prompts:   /api/v1/prompts (GET, PUT)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present - file is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Some(CliCommand::Ask { question }) => {
            let db = Arc::new(EngramDb::open().expect("Failed to open EngramDb"));
            if let Err(e) = db.seed_prompts() {
                tracing::warn!("Failed to seed prompts: {}", e);
            }

            let persisted = PersistedConfig::load().await;
            let config = build_coordinator_config(&persisted, None);
            let mut coordinator = Coordinator::new(config, db);

            match coordinator.ask(&question).await {
                Ok(outcome) => {
                    println!("{}", outcome.response);
                    if let Some(memory) = &outcome.memory {
                        println!("(remembered as memory #{})", memory.id);
                    }
                }
                Err(e) => {
                    eprintln!("Exchange failed: {}", e);
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Some(CliCommand::Serve { port }) => run_server(port).await,
        None => run_server(8080).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_config_merge() {
        let mut config = PersistedConfig {
            global_provider: Some("anthropic".to_string()),
            global_model: Some("model-a".to_string()),
            ..PersistedConfig::default()
        };

        let mut updates = PersistedConfig {
            global_model: Some("model-b".to_string()),
            ..PersistedConfig::default()
        };
        updates
            .per_agent_models
            .insert("analyst".to_string(), "model-c".to_string());

        config.merge(updates);

        // Present fields overwrite, absent fields keep
        assert_eq!(config.global_provider.as_deref(), Some("anthropic"));
        assert_eq!(config.global_model.as_deref(), Some("model-b"));
        assert_eq!(
            config.per_agent_models.get("analyst").map(String::as_str),
            Some("model-c")
        );
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(parse_provider("anthropic"), Some(LlmProvider::Anthropic));
        assert_eq!(parse_provider("deepseek"), Some(LlmProvider::DeepSeek));
        assert_eq!(parse_provider("unknown"), None);
    }

    #[test]
    fn test_build_coordinator_config_overrides() {
        let persisted = PersistedConfig {
            global_provider: Some("openai".to_string()),
            global_model: Some("gpt-4o".to_string()),
            recall_limit: Some(3),
            ..PersistedConfig::default()
        };
        let settings = ApiSettings {
            global_provider: None,
            global_model: Some("gpt-4o-mini".to_string()),
            base_url: Some("http://localhost:11434/v1".to_string()),
        };

        let config = build_coordinator_config(&persisted, Some(&settings));

        assert_eq!(config.global_provider, LlmProvider::OpenAI);
        // Request settings win over persisted config
        assert_eq!(config.global_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.recall_limit, 3);
    }
}
