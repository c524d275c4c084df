//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind the
//! [`VectorIndex`] seam, hiding away the verbose builder pattern and keeping the
//! rest of the application decoupled from `qdrant-client`.
//!
//! Point payload: `{ "text", "filename", "page", "directory" }`.

use std::collections::HashMap;

use crate::config::{DistanceKind, RagConfig};
use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{RagHit, RagRecord};

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointId, PointStruct,
    SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder, point_id::PointIdOptions, value,
};
use tracing::{debug, info, warn};

/// A facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
    upsert_batch: usize,
    exact: bool,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports optional API
    /// key authentication. No network call is made here.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            upsert_batch: cfg.upsert_batch,
            exact: cfg.exact_search,
        })
    }

    async fn ensure_collection_impl(&self, dim: usize) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(self.collection.clone())
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if exists {
            debug!(collection = %self.collection, "collection already exists");
            return Ok(());
        }

        warn!(collection = %self.collection, dim, "collection missing, creating");
        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(collection = %self.collection, "collection created");
        Ok(())
    }

    async fn upsert_impl(&self, records: Vec<RagRecord>) -> Result<usize, RagError> {
        if records.is_empty() {
            return Ok(0);
        }
        let total = records.len();
        let mut points: Vec<PointStruct> = records.into_iter().map(to_point).collect();

        while !points.is_empty() {
            let rest = points.split_off(points.len().min(self.upsert_batch));
            let batch = std::mem::replace(&mut points, rest);
            debug!(collection = %self.collection, batch = batch.len(), "upserting points");
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, batch).wait(true))
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
        }

        info!(collection = %self.collection, total, "upsert completed");
        Ok(total)
    }

    async fn search_impl(&self, vector: Vec<f32>, top_k: u64) -> Result<Vec<RagHit>, RagError> {
        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if self.exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let hits: Vec<RagHit> = res
            .result
            .into_iter()
            .map(|p| {
                let payload = qpayload_to_json(p.payload);
                RagHit {
                    id: p.id.map(point_id_to_string).unwrap_or_default(),
                    score: p.score,
                    text: payload
                        .get("text")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    filename: payload
                        .get("filename")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    page: payload.get("page").and_then(|v| v.as_u64()),
                    directory: payload
                        .get("directory")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                }
            })
            .collect();

        debug!(collection = %self.collection, hits = hits.len(), "search completed");
        Ok(hits)
    }

    async fn count_impl(&self) -> Result<u64, RagError> {
        let exists = self
            .client
            .collection_exists(self.collection.clone())
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(0);
        }
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }
}

impl VectorIndex for QdrantFacade {
    fn name(&self) -> &'static str {
        "qdrant"
    }

    fn ensure_collection<'a>(&'a self, dim: usize) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(self.ensure_collection_impl(dim))
    }

    fn upsert<'a>(&'a self, records: Vec<RagRecord>) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(self.upsert_impl(records))
    }

    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<RagHit>, RagError>> {
        Box::pin(self.search_impl(vector, top_k))
    }

    fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>> {
        Box::pin(self.count_impl())
    }
}

/// Builds a Qdrant point from a record.
fn to_point(r: RagRecord) -> PointStruct {
    let mut payload: HashMap<String, QValue> = HashMap::with_capacity(4);
    payload.insert("text".into(), qstring(r.chunk.text));
    payload.insert("filename".into(), qstring(r.chunk.meta.filename));
    payload.insert(
        "page".into(),
        QValue {
            kind: Some(value::Kind::IntegerValue(r.chunk.meta.page as i64)),
        },
    );
    payload.insert("directory".into(), qstring(r.chunk.meta.directory));

    let pid: PointId = r.id.into();
    PointStruct {
        id: Some(pid),
        payload,
        vectors: Some(r.embedding.into()),
        ..Default::default()
    }
}

fn qstring(s: String) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s)),
    }
}

fn point_id_to_string(id: PointId) -> String {
    match id.point_id_options {
        Some(PointIdOptions::Uuid(u)) => u,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// Converts a Qdrant payload into JSON. Nested values map to `Null`.
fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ChunkMeta, DocumentChunk};

    #[test]
    fn point_carries_chunk_payload() {
        let p = to_point(RagRecord {
            id: "6f1c1f39-5f4e-4f0e-9d55-3b7f1c2d9a10".into(),
            embedding: vec![0.1, 0.2],
            chunk: DocumentChunk {
                text: "The sky is blue.".into(),
                meta: ChunkMeta {
                    filename: "sky.pdf".into(),
                    page: 2,
                    directory: "physics".into(),
                },
            },
        });

        let json = qpayload_to_json(p.payload.clone());
        assert_eq!(json["text"], "The sky is blue.");
        assert_eq!(json["filename"], "sky.pdf");
        assert_eq!(json["page"], 2);
        assert_eq!(json["directory"], "physics");
        assert_eq!(
            p.id.map(point_id_to_string).as_deref(),
            Some("6f1c1f39-5f4e-4f0e-9d55-3b7f1c2d9a10")
        );
    }

    #[test]
    fn facade_builds_without_network() {
        let cfg = RagConfig::new_default("http://localhost:6334", "document_store");
        assert_eq!(QdrantFacade::new(&cfg).unwrap().name(), "qdrant");
    }
}
