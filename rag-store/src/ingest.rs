//! Ingestion pipeline: pages → chunks → embeddings → index.
//!
//! Every chunk gets a fresh random id, so ingesting the same document twice
//! stores two independent sets of records.

use std::time::Instant;

use services::uuid::record_uuid;
use tracing::{debug, info};

use crate::chunker::split_text;
use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_all;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{ChunkMeta, DocumentChunk, DocumentMeta, IngestReport, RagRecord};

/// Splits each page into chunks; page indices follow `pages` order.
pub fn chunk_pages(cfg: &RagConfig, doc: &DocumentMeta, pages: &[String]) -> Vec<DocumentChunk> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(page, text)| {
            split_text(text, cfg.chunk_size, cfg.chunk_overlap)
                .into_iter()
                .map(move |chunk| DocumentChunk {
                    text: chunk,
                    meta: ChunkMeta {
                        filename: doc.filename.clone(),
                        page,
                        directory: doc.directory.clone(),
                    },
                })
        })
        .collect()
}

/// Chunks, embeds and upserts `pages` of one document.
///
/// # Errors
/// Embedding failures, dimension mismatches, or index failures. Nothing is
/// written when embedding fails.
pub async fn ingest_pages(
    cfg: &RagConfig,
    index: &dyn VectorIndex,
    provider: &dyn EmbeddingsProvider,
    doc: &DocumentMeta,
    pages: &[String],
) -> Result<IngestReport, RagError> {
    let started = Instant::now();
    let chunks = chunk_pages(cfg, doc, pages);
    if chunks.is_empty() {
        debug!(filename = %doc.filename, "no chunks to ingest");
        return Ok(IngestReport { ids: Vec::new() });
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embed_all(&texts, provider, cfg.dim, cfg.embed_concurrency).await?;

    let records: Vec<RagRecord> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, embedding)| RagRecord {
            id: record_uuid().to_string(),
            embedding,
            chunk,
        })
        .collect();
    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

    index.upsert(records).await?;

    info!(
        filename = %doc.filename,
        directory = %doc.directory,
        pages = pages.len(),
        chunks = ids.len(),
        backend = index.name(),
        latency_ms = started.elapsed().as_millis(),
        "document ingested"
    );
    Ok(IngestReport { ids })
}
