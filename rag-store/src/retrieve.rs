//! Retrieval: embed the query, search the index.

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{RagHit, RagQuery};

use tracing::trace;

/// Embeds the query text and returns hits ranked best-first.
///
/// # Errors
/// Returns embedding/provider errors or index failures.
pub async fn rag_context(
    index: &dyn VectorIndex,
    provider: &dyn EmbeddingsProvider,
    query: RagQuery<'_>,
) -> Result<Vec<RagHit>, RagError> {
    trace!("retrieve::rag_context top_k={}", query.top_k);

    let qv = provider.embed(query.text).await?;
    let hits = index.search(qv, query.top_k).await?;

    trace!("retrieve::rag_context hits={}", hits.len());
    Ok(hits)
}

/// Joins hit texts with `\n`, keeping rank order.
pub fn join_context(hits: &[RagHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
