//! Vector index seam.
//!
//! Two implementations: [`crate::qdrant_facade::QdrantFacade`] (external,
//! persistent) and [`memory::MemoryIndex`] (in-process).

use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::record::{RagHit, RagRecord};

pub mod memory;

pub trait VectorIndex: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Creates the collection if it does not exist yet.
    fn ensure_collection<'a>(&'a self, dim: usize) -> BoxFuture<'a, Result<(), RagError>>;

    /// Inserts records; returns how many were written.
    fn upsert<'a>(&'a self, records: Vec<RagRecord>) -> BoxFuture<'a, Result<usize, RagError>>;

    /// Top-`top_k` hits for `vector`, best first.
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<RagHit>, RagError>>;

    /// Number of stored records.
    fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>>;
}
