//! Shared LLM service with three profiles: `document`, `conversation`, `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+key+timeout).
//! - If the `conversation` profile is not provided, it falls back to `document`.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # async fn run() -> Result<(), ai_llm_service::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//! let answer = svc.generate_document("Hello world", None).await?;
//! let emb = svc.embed("Ferris").await?;
//! println!("{answer} / dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    chat::ChatTurn,
    config::{
        default_config::{config_conversation, config_document, config_embedding},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::open_ai_service::OpenAiService,
};

/// Manages the three logical profiles and their cached clients.
pub struct LlmServiceProfiles {
    document: LlmModelConfig,
    conversation: LlmModelConfig,
    embedding: LlmModelConfig,

    clients: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service from explicit configs.
    ///
    /// `conversation_opt = None` reuses the document profile.
    pub fn new(
        document: LlmModelConfig,
        conversation_opt: Option<LlmModelConfig>,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let conversation = conversation_opt.unwrap_or_else(|| document.clone());

        Ok(Self {
            document,
            conversation,
            embedding,
            clients: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds all profiles from the environment (see `config::default_config`).
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(
            config_document()?,
            Some(config_conversation()?),
            config_embedding()?,
            Some(10),
        )
    }

    /// Single-turn generation with the **document** profile.
    pub async fn generate_document(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, AiLlmError> {
        let cli = self.client_for(&self.document).await?;
        cli.generate(prompt, system).await
    }

    /// Multi-turn generation with the **conversation** profile.
    pub async fn chat_conversation(&self, history: &[ChatTurn]) -> Result<String, AiLlmError> {
        let cli = self.client_for(&self.conversation).await?;
        cli.chat(history).await
    }

    /// Embeds `input` with the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let cli = self.client_for(&self.embedding).await?;
        cli.embeddings(input).await
    }

    /// Health snapshot for each distinct profile.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(3);
        list.push(self.document.clone());
        if self.conversation != self.document {
            list.push(self.conversation.clone());
        }
        if self.embedding != self.document && self.embedding != self.conversation {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// `(document, conversation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig, &LlmModelConfig) {
        (&self.document, &self.conversation, &self.embedding)
    }

    async fn client_for(&self, cfg: &LlmModelConfig) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.clients.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.clients.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Identifies a distinct HTTP client configuration.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_version: Option<String>,
    timeout: Option<u64>,
    max_tokens: Option<u32>,
    // f32 is not Hash; the bit pattern is enough to tell profiles apart.
    temperature: Option<u32>,
    top_p: Option<u32>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            api_version: cfg.api_version.clone(),
            timeout: cfg.timeout_secs,
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature.map(f32::to_bits),
            top_p: cfg.top_p.map(f32::to_bits),
        }
    }
}
