use crate::errors::RagError;
use std::{future::Future, pin::Pin};

pub mod llm_embedder;

/// Boxed future returned by the async traits of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Asynchronous embedding provider.
///
/// Implement this trait to plug in an embedding backend. The same provider must
/// be used for ingestion and for queries.
pub trait EmbeddingsProvider: Send + Sync {
    /// Produces one embedding vector for `text`.
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>>;
}
