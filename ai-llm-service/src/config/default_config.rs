//! Default LLM configs loaded from environment variables.
//!
//! Three roles share one provider/endpoint/key:
//!
//! - **document**     → RAG answers, QA/MCQ generation, summaries
//! - **conversation** → voice replies (short, `max_tokens = 150`)
//! - **embedding**    → chunk and query embeddings
//!
//! # Environment variables
//!
//! - `LLM_KIND`                 = `openai` (default) | `azure`
//! - `OPENAI_API_KEY`           = API key (required)
//! - `OPENAI_ENDPOINT`          = base URL (default `https://api.openai.com`)
//! - `CHAT_MODEL`               = document model (default `gpt-3.5-turbo`)
//! - `CONVERSATION_MODEL`       = conversation model (defaults to `CHAT_MODEL`)
//! - `EMBEDDING_MODEL`          = embedding model (default `text-embedding-ada-002`)
//! - `AZURE_OPENAI_API_VERSION` = Azure api-version (default `2024-08-01-preview`)
//! - `LLM_MAX_TOKENS`           = optional max tokens for the document profile
//! - `LLM_TIMEOUT_SECS`         = request timeout (default 60)
//! - `LLM_TEMPERATURE`          = document temperature (default 0.0)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_f32, env_opt_u32, env_opt_u64, must_env, opt_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";
pub const CONVERSATION_MAX_TOKENS: u32 = 150;
/// Deterministic output keeps QA/MCQ JSON parseable.
pub const DEFAULT_DOCUMENT_TEMPERATURE: f32 = 0.0;

/// Fields shared by every profile.
#[derive(Debug, Clone)]
struct Shared {
    provider: LlmProvider,
    endpoint: String,
    api_key: String,
    api_version: Option<String>,
    timeout_secs: u64,
}

fn shared_from_env() -> Result<Shared, AiLlmError> {
    let provider = match opt_env("LLM_KIND") {
        Some(kind) => {
            LlmProvider::parse(&kind).ok_or(ConfigError::UnsupportedProvider(kind))?
        }
        None => LlmProvider::OpenAI,
    };

    let endpoint = match provider {
        // Azure has no public default host.
        LlmProvider::AzureOpenAI => must_env("OPENAI_ENDPOINT")?,
        LlmProvider::OpenAI => {
            opt_env("OPENAI_ENDPOINT").unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string())
        }
    };
    validate_http_endpoint("OPENAI_ENDPOINT", &endpoint)?;

    let api_version = match provider {
        LlmProvider::AzureOpenAI => Some(
            opt_env("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
        ),
        LlmProvider::OpenAI => None,
    };

    Ok(Shared {
        provider,
        endpoint,
        api_key: must_env("OPENAI_API_KEY")?,
        api_version,
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60),
    })
}

fn build(shared: &Shared, model: String) -> Result<LlmModelConfig, AiLlmError> {
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    Ok(LlmModelConfig {
        provider: shared.provider,
        model,
        endpoint: shared.endpoint.clone(),
        api_key: Some(shared.api_key.clone()),
        api_version: shared.api_version.clone(),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(shared.timeout_secs),
    })
}

/// Config for the **document** profile (RAG answers, QA/MCQ, summary).
///
/// # Defaults
/// - `temperature = Some(0.0)` unless `LLM_TEMPERATURE` is set
pub fn config_document() -> Result<LlmModelConfig, AiLlmError> {
    let shared = shared_from_env()?;
    let model = opt_env("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    document_profile(
        &shared,
        model,
        env_opt_f32("LLM_TEMPERATURE")?,
        env_opt_u32("LLM_MAX_TOKENS")?,
    )
}

fn document_profile(
    shared: &Shared,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
) -> Result<LlmModelConfig, AiLlmError> {
    let temperature = temperature.unwrap_or(DEFAULT_DOCUMENT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    let mut cfg = build(shared, model)?;
    cfg.max_tokens = max_tokens;
    cfg.temperature = Some(temperature);
    Ok(cfg)
}

/// Config for the **conversation** profile (voice replies).
///
/// # Defaults
/// - `max_tokens = Some(150)`
/// - `temperature = Some(0.7)`
pub fn config_conversation() -> Result<LlmModelConfig, AiLlmError> {
    let shared = shared_from_env()?;
    let model = opt_env("CONVERSATION_MODEL")
        .or_else(|| opt_env("CHAT_MODEL"))
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

    let mut cfg = build(&shared, model)?;
    cfg.max_tokens = Some(CONVERSATION_MAX_TOKENS);
    cfg.temperature = Some(0.7);
    Ok(cfg)
}

/// Config for the **embedding** profile.
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let shared = shared_from_env()?;
    let model =
        opt_env("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
    build(&shared, model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Shared {
        Shared {
            provider: LlmProvider::OpenAI,
            endpoint: DEFAULT_OPENAI_ENDPOINT.into(),
            api_key: "k".into(),
            api_version: None,
            timeout_secs: 60,
        }
    }

    #[test]
    fn document_profile_is_deterministic_by_default() {
        let cfg = document_profile(&shared(), "gpt-3.5-turbo".into(), None, None).unwrap();
        assert_eq!(cfg.temperature, Some(0.0));
        assert_eq!(cfg.max_tokens, None);

        let cfg = document_profile(&shared(), "gpt-3.5-turbo".into(), Some(0.4), Some(300)).unwrap();
        assert_eq!(cfg.temperature, Some(0.4));
        assert_eq!(cfg.max_tokens, Some(300));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        assert!(document_profile(&shared(), "m".into(), Some(2.5), None).is_err());
    }
}
