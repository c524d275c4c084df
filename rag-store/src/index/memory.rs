//! In-process vector index (cosine similarity, brute force).

use std::cmp::Ordering;

use tokio::sync::RwLock;
use tracing::debug;

use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{RagHit, RagRecord};

/// Keeps every record in memory; contents are lost on restart.
pub struct MemoryIndex {
    dim: usize,
    records: RwLock<Vec<RagRecord>>,
}

impl MemoryIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            records: RwLock::new(Vec::new()),
        }
    }

    fn check_dim(&self, got: usize) -> Result<(), RagError> {
        if got != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got,
                want: self.dim,
            });
        }
        Ok(())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

impl VectorIndex for MemoryIndex {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn ensure_collection<'a>(&'a self, dim: usize) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(async move { self.check_dim(dim) })
    }

    fn upsert<'a>(&'a self, records: Vec<RagRecord>) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            for r in &records {
                self.check_dim(r.embedding.len())?;
            }
            let n = records.len();
            self.records.write().await.extend(records);
            debug!(upserted = n, "memory index upsert");
            Ok(n)
        })
    }

    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<RagHit>, RagError>> {
        Box::pin(async move {
            self.check_dim(vector.len())?;
            let records = self.records.read().await;

            let mut scored: Vec<(f32, &RagRecord)> = records
                .iter()
                .map(|r| (cosine(&vector, &r.embedding), r))
                .collect();
            // Stable sort: ties keep insertion order.
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

            Ok(scored
                .into_iter()
                .take(top_k as usize)
                .map(|(score, r)| RagHit {
                    id: r.id.clone(),
                    score,
                    text: r.chunk.text.clone(),
                    filename: Some(r.chunk.meta.filename.clone()),
                    page: Some(r.chunk.meta.page as u64),
                    directory: Some(r.chunk.meta.directory.clone()),
                })
                .collect())
        })
    }

    fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>> {
        Box::pin(async move { Ok(self.records.read().await.len() as u64) })
    }
}
