//! Embedding executor with bounded concurrency and dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

/// Embeds `texts`, returning vectors in the same order.
///
/// At most `concurrency` requests are in flight. The first failure aborts the
/// whole batch.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if a vector is not `expected_dim`
/// long, or the provider's error.
pub async fn embed_all(
    texts: &[String],
    provider: &dyn EmbeddingsProvider,
    expected_dim: usize,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    info!(total = texts.len(), concurrency, "embedding chunks");

    // Futures are created eagerly; the result must stay `Send` for axum handlers.
    let pending: Vec<_> = texts.iter().map(|text| provider.embed(text)).collect();
    let vectors: Vec<Vec<f32>> = stream::iter(pending)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    if let Some(v) = vectors.iter().find(|v| v.len() != expected_dim) {
        return Err(RagError::VectorSizeMismatch {
            got: v.len(),
            want: expected_dim,
        });
    }

    debug!(count = vectors.len(), "embeddings filled");
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::BoxFuture;

    /// Vector encodes the text length so order can be checked.
    struct LenEmbedder;

    impl EmbeddingsProvider for LenEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async move { Ok(vec![text.len() as f32, 1.0]) })
        }
    }

    #[tokio::test]
    async fn keeps_input_order() {
        let texts: Vec<String> = ["a", "bbb", "cc"].iter().map(|s| s.to_string()).collect();
        let out = embed_all(&texts, &LenEmbedder, 2, 3).await.unwrap();
        assert_eq!(out, vec![vec![1.0, 1.0], vec![3.0, 1.0], vec![2.0, 1.0]]);
    }

    #[tokio::test]
    async fn dimension_is_enforced() {
        let texts = vec!["x".to_string()];
        let err = embed_all(&texts, &LenEmbedder, 3, 1).await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 2, want: 3 }));
    }
}
