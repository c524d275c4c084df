//! Document RAG store: chunking, embedding, indexing and retrieval.
//!
//! - [`RagStore::ingest_pages`] splits page texts, embeds every chunk and
//!   upserts one record per chunk.
//! - [`RagStore::rag_context`] embeds a query and returns the top-K hits.
//!
//! The index is either Qdrant ([`QdrantFacade`]) or in-process
//! ([`MemoryIndex`]); both sit behind [`VectorIndex`].

mod chunker;
mod config;
mod embed;
mod embed_pool;
mod errors;
mod index;
mod ingest;
mod qdrant_facade;
mod record;
mod retrieve;

use std::sync::Arc;

pub use chunker::split_text;
pub use config::{DistanceKind, IndexBackend, RagConfig};
pub use embed::llm_embedder::LlmEmbedder;
pub use embed::{BoxFuture, EmbeddingsProvider};
pub use errors::RagError;
pub use index::VectorIndex;
pub use index::memory::MemoryIndex;
pub use qdrant_facade::QdrantFacade;
pub use record::{ChunkMeta, DocumentChunk, DocumentMeta, IngestReport, RagHit, RagQuery, RagRecord};
pub use retrieve::join_context;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use tracing::{debug, info, trace};

/// High-level facade wiring configuration, index and embedder.
///
/// This is the single entry point recommended for application code.
#[derive(Clone)]
pub struct RagStore {
    cfg: RagConfig,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingsProvider>,
}

impl RagStore {
    pub fn new(
        cfg: RagConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Self {
        Self {
            cfg,
            index,
            embedder,
        }
    }

    /// Builds the index selected by `cfg.backend` and an embedder over the
    /// embedding profile of `svc`.
    ///
    /// # Errors
    /// Returns `RagError::Config` for invalid settings or a client that cannot
    /// be constructed.
    pub fn from_config(cfg: RagConfig, svc: Arc<LlmServiceProfiles>) -> Result<Self, RagError> {
        cfg.validate()?;
        let index: Arc<dyn VectorIndex> = match cfg.backend {
            IndexBackend::Qdrant => Arc::new(QdrantFacade::new(&cfg)?),
            IndexBackend::Memory => Arc::new(MemoryIndex::new(cfg.dim)),
        };
        let embedder = Arc::new(LlmEmbedder::new(svc, cfg.dim));
        info!(
            backend = index.name(),
            collection = %cfg.collection,
            dim = cfg.dim,
            "RagStore initialized"
        );
        Ok(Self::new(cfg, index, embedder))
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Creates the collection if needed.
    pub async fn ensure_ready(&self) -> Result<(), RagError> {
        self.index.ensure_collection(self.cfg.dim).await
    }

    /// `true` until the first successful ingestion.
    pub async fn is_empty(&self) -> Result<bool, RagError> {
        let n = self.index.count().await?;
        trace!("RagStore::is_empty count={n}");
        Ok(n == 0)
    }

    /// Chunks, embeds and stores the pages of one document.
    ///
    /// Re-ingesting the same document appends a second set of records.
    pub async fn ingest_pages(
        &self,
        doc: &DocumentMeta,
        pages: &[String],
    ) -> Result<IngestReport, RagError> {
        self.ensure_ready().await?;
        ingest::ingest_pages(
            &self.cfg,
            self.index.as_ref(),
            self.embedder.as_ref(),
            doc,
            pages,
        )
        .await
    }

    /// Retrieves top-K hits for a textual query, best first.
    ///
    /// Callers check [`RagStore::is_empty`] first; an empty index simply
    /// yields no hits here.
    pub async fn rag_context(&self, query: RagQuery<'_>) -> Result<Vec<RagHit>, RagError> {
        debug!(top_k = query.top_k, "RagStore::rag_context");
        retrieve::rag_context(self.index.as_ref(), self.embedder.as_ref(), query).await
    }
}
