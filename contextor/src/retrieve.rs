//! Retrieval step shared by every generation flow.

use rag_store::{RagHit, RagQuery, RagStore, join_context};
use tracing::debug;

use crate::api_types::Source;
use crate::error::ContextorError;

/// Context string plus the hits it was built from, in ranked order.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub context: String,
    pub hits: Vec<RagHit>,
}

impl Retrieved {
    pub fn sources(&self) -> Vec<Source> {
        self.hits
            .iter()
            .map(|h| Source {
                content: h.text.clone(),
                score: h.score,
            })
            .collect()
    }
}

/// Fails with [`ContextorError::NoIndex`] before any embedding call when the
/// store holds no records.
pub async fn retrieve(store: &RagStore, text: &str, top_k: u64) -> Result<Retrieved, ContextorError> {
    if store.is_empty().await? {
        return Err(ContextorError::NoIndex);
    }
    let hits = store.rag_context(RagQuery { text, top_k }).await?;
    let context = join_context(&hits);
    debug!(top_k, hits = hits.len(), context_chars = context.len(), "context retrieved");
    Ok(Retrieved { context, hits })
}
