//! Shared LLM access for the backend.
//!
//! - [`config`]: model configs and env-driven defaults.
//! - [`services::open_ai_service`]: chat completions + embeddings over the
//!   OpenAI and Azure OpenAI REST surfaces.
//! - [`service_profiles`]: the `document` / `conversation` / `embedding`
//!   profiles shared by the whole application.
//! - [`health_service`]: best-effort provider probes for `/health`.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;

pub use chat::{ChatRole, ChatTurn};
pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
