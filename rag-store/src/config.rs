//! Runtime and collection configuration.

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine similarity (what the embedding model is trained for).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl DistanceKind {
    /// Parses `cosine` / `dot` / `euclid` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Some(Self::Cosine),
            "dot" => Some(Self::Dot),
            "euclid" | "euclidean" => Some(Self::Euclid),
            _ => None,
        }
    }
}

/// Which index implementation backs the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexBackend {
    /// External Qdrant collection (persistent).
    Qdrant,
    /// In-process index, lost on restart.
    Memory,
}

/// Configuration for ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    pub backend: IndexBackend,
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Qdrant collection distance; the in-memory index always ranks by cosine.
    pub distance: DistanceKind,
    /// Embedding dimensionality; every record and query must match it.
    pub dim: usize,
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Concurrent embedding requests during ingestion.
    pub embed_concurrency: usize,
    /// `k` for `/query`.
    pub query_top_k: u64,
    /// `k` for QA / MCQ / summary.
    pub default_top_k: u64,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl RagConfig {
    /// Defaults for a given collection and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            backend: IndexBackend::Qdrant,
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            dim: 1536,
            chunk_size: 1000,
            chunk_overlap: 200,
            upsert_batch: 64,
            embed_concurrency: 4,
            query_top_k: 3,
            default_top_k: 4,
            exact_search: false,
        }
    }

    /// In-memory store with the given dimensionality.
    pub fn in_memory(dim: usize) -> Self {
        Self {
            backend: IndexBackend::Memory,
            dim,
            ..Self::new_default("memory://", "document_store")
        }
    }

    /// Reads the environment:
    ///
    /// - `VECTOR_STORE` = `qdrant` (default) | `memory`
    /// - `QDRANT_URL` (default `http://localhost:6334`), `QDRANT_API_KEY`, `QDRANT_COLLECTION`
    /// - `EMBEDDING_DIM`, `CHUNK_SIZE`, `CHUNK_OVERLAP`, `UPSERT_BATCH`, `EMBED_CONCURRENCY`
    /// - `RAG_QUERY_TOP_K`, `RAG_DEFAULT_TOP_K`
    /// - `QDRANT_DISTANCE` = `cosine` (default) | `dot` | `euclid`, `QDRANT_EXACT_SEARCH` (`false`)
    pub fn from_env() -> Result<Self, RagError> {
        let backend = match env("VECTOR_STORE").as_deref().map(str::to_ascii_lowercase) {
            None => IndexBackend::Qdrant,
            Some(v) if v == "qdrant" => IndexBackend::Qdrant,
            Some(v) if v == "memory" => IndexBackend::Memory,
            Some(other) => {
                return Err(RagError::Config(format!(
                    "VECTOR_STORE must be `qdrant` or `memory`, got `{other}`"
                )));
            }
        };

        let mut cfg = Self::new_default(
            env("QDRANT_URL").unwrap_or_else(|| "http://localhost:6334".to_string()),
            env("QDRANT_COLLECTION").unwrap_or_else(|| "document_store".to_string()),
        );
        cfg.backend = backend;
        cfg.qdrant_api_key = env("QDRANT_API_KEY");
        cfg.dim = parse_or("EMBEDDING_DIM", cfg.dim)?;
        cfg.chunk_size = parse_or("CHUNK_SIZE", cfg.chunk_size)?;
        cfg.chunk_overlap = parse_or("CHUNK_OVERLAP", cfg.chunk_overlap)?;
        cfg.upsert_batch = parse_or("UPSERT_BATCH", cfg.upsert_batch)?;
        cfg.embed_concurrency = parse_or("EMBED_CONCURRENCY", cfg.embed_concurrency)?;
        cfg.query_top_k = parse_or("RAG_QUERY_TOP_K", cfg.query_top_k)?;
        cfg.default_top_k = parse_or("RAG_DEFAULT_TOP_K", cfg.default_top_k)?;
        if let Some(v) = env("QDRANT_DISTANCE") {
            cfg.distance = DistanceKind::parse(&v).ok_or_else(|| {
                RagError::Config(format!(
                    "QDRANT_DISTANCE must be `cosine`, `dot` or `euclid`, got `{v}`"
                ))
            })?;
        }
        cfg.exact_search = parse_or("QDRANT_EXACT_SEARCH", cfg.exact_search)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.backend == IndexBackend::Qdrant && self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.dim == 0 {
            return Err(RagError::Config("dim must be > 0".into()));
        }
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(
                "chunk_size must be > 0 and greater than chunk_overlap".into(),
            ));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.query_top_k == 0 || self.default_top_k == 0 {
            return Err(RagError::Config("top_k values must be > 0".into()));
        }
        Ok(())
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, RagError> {
    match env(name) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| RagError::Config(format!("{name} has an invalid value: {v}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RagConfig::new_default("http://localhost:6334", "document_store");
        assert!(cfg.validate().is_ok());
        assert_eq!((cfg.chunk_size, cfg.chunk_overlap), (1000, 200));
        assert_eq!((cfg.query_top_k, cfg.default_top_k), (3, 4));
    }

    #[test]
    fn distance_names_parse() {
        assert_eq!(DistanceKind::parse("Cosine"), Some(DistanceKind::Cosine));
        assert_eq!(DistanceKind::parse(" dot "), Some(DistanceKind::Dot));
        assert_eq!(DistanceKind::parse("euclid"), Some(DistanceKind::Euclid));
        assert_eq!(DistanceKind::parse("manhattan"), None);
    }

    #[test]
    fn overlap_must_be_smaller_than_window() {
        let mut cfg = RagConfig::in_memory(8);
        cfg.chunk_overlap = cfg.chunk_size;
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));
    }
}
