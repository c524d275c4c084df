//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// Where a chunk came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub filename: String,
    /// Index of the page among the pages that produced text.
    pub page: usize,
    pub directory: String,
}

/// One window of document text. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub meta: ChunkMeta,
}

/// Record stored in the index; 1:1 with a chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct RagRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub chunk: DocumentChunk,
}

/// Identifies an uploaded document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMeta {
    pub filename: String,
    pub directory: String,
}

/// Outcome of one ingestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestReport {
    /// Ids of the new records, in chunk order.
    pub ids: Vec<String>,
}

impl IngestReport {
    pub fn chunks(&self) -> usize {
        self.ids.len()
    }
}

/// Query parameters for retrieval.
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: u64,
}

/// A single retrieval hit. Hits are returned best-first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RagHit {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub filename: Option<String>,
    pub page: Option<u64>,
    pub directory: Option<String>,
}
