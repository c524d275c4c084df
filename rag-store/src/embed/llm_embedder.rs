//! Embedding provider backed by the shared LLM service profiles.

use std::sync::Arc;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use tracing::warn;

use crate::{BoxFuture, EmbeddingsProvider, RagError};

/// Calls the **embedding** profile and checks the vector size.
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: usize) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let v = self
                .svc
                .embed(text)
                .await
                .map_err(|e| RagError::Embedding(e.to_string()))?;

            if v.len() != self.dim {
                warn!(got = v.len(), want = self.dim, "embedding dimension mismatch");
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }
            Ok(v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn embedder(dim: usize, vector: Vec<f32>) -> (MockServer, LlmEmbedder) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": [ { "embedding": vector } ] })),
            )
            .mount(&server)
            .await;

        let cfg = LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "text-embedding-ada-002".into(),
            endpoint: server.uri(),
            api_key: Some("k".into()),
            api_version: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        };
        let svc = LlmServiceProfiles::new(cfg.clone(), None, cfg, Some(1)).unwrap();
        (server, LlmEmbedder::new(Arc::new(svc), dim))
    }

    #[tokio::test]
    async fn returns_vector_of_configured_size() {
        let (_server, emb) = embedder(3, vec![0.1, 0.2, 0.3]).await;
        assert_eq!(emb.embed("hello").await.unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn wrong_size_is_rejected() {
        let (_server, emb) = embedder(4, vec![0.1, 0.2, 0.3]).await;
        assert!(matches!(
            emb.embed("hello").await,
            Err(RagError::VectorSizeMismatch { got: 3, want: 4 })
        ));
    }
}
