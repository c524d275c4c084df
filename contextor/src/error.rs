//! Typed error for the contextor crate.

use ai_llm_service::AiLlmError;
use rag_store::RagError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Nothing has been ingested yet.
    #[error("no documents have been uploaded yet")]
    NoIndex,

    #[error("query must not be empty")]
    EmptyQuery,

    /// Requested number of retrieved chunks was zero.
    #[error("k must be at least 1")]
    InvalidTopK,

    /// LLM, embedding endpoint or vector index failed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Model output did not match the expected JSON shape.
    #[error("failed to parse {what} output: {reason}")]
    MalformedOutput { what: &'static str, reason: String },

    /// Local rag-store failures (config, dimension mismatch).
    #[error("RAG error: {0}")]
    Rag(RagError),

    /// LLM client misconfiguration.
    #[error("LLM error: {0}")]
    Llm(AiLlmError),
}

impl From<RagError> for ContextorError {
    fn from(e: RagError) -> Self {
        if e.is_upstream() {
            ContextorError::UpstreamUnavailable(e.to_string())
        } else {
            ContextorError::Rag(e)
        }
    }
}

impl From<AiLlmError> for ContextorError {
    fn from(e: AiLlmError) -> Self {
        if e.is_upstream() {
            ContextorError::UpstreamUnavailable(e.to_string())
        } else {
            ContextorError::Llm(e)
        }
    }
}

impl ContextorError {
    /// Caused by the request (or the state the client put the system in).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ContextorError::NoIndex | ContextorError::EmptyQuery | ContextorError::InvalidTopK
        )
    }
}
