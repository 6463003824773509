use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::codec::decode;
use crate::error::{RagError, RagResult};
use crate::models::{ChunkMatch, ChunkRecord, IndexInfo, IndexSchema, KnnQuery, counter_key};
use crate::store::VectorStore;

#[derive(Default)]
struct State {
    indexes: HashMap<String, IndexSchema>,
    counters: HashMap<String, u64>,
    records: BTreeMap<String, ChunkRecord>,
}

impl State {
    fn records_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a ChunkRecord> {
        self.records
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(_, record)| record)
    }
}

/// Process-local store for development and tests.
///
/// Mirrors the backing store's observable behavior: records outlive their
/// index unless dropped with `delete_docs`, counters are independent of
/// indexes, and a recreated index sees every record under its prefix.
/// KNN is an exact scan, not an approximate index.
#[derive(Default)]
pub struct InMemoryVectorStore {
    state: RwLock<State>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn index_info(&self, name: &str) -> RagResult<Option<IndexInfo>> {
        let state = self.state.read().await;

        Ok(state.indexes.get(name).map(|schema| IndexInfo {
            name: name.to_string(),
            num_docs: state.records_under(&schema.prefix).count() as u64,
        }))
    }

    async fn create_index(&self, schema: &IndexSchema) -> RagResult<()> {
        let mut state = self.state.write().await;

        if state.indexes.contains_key(&schema.name) {
            return Err(RagError::Store("Index already exists".to_string()));
        }
        state.indexes.insert(schema.name.clone(), schema.clone());
        Ok(())
    }

    async fn drop_index(&self, name: &str, delete_docs: bool) -> RagResult<()> {
        let mut state = self.state.write().await;

        let schema = state
            .indexes
            .remove(name)
            .ok_or_else(|| RagError::IndexNotFound(name.to_string()))?;

        if delete_docs {
            state
                .records
                .retain(|key, _| !key.starts_with(&schema.prefix));
        }
        Ok(())
    }

    async fn next_chunk_id(&self, index: &str) -> RagResult<u64> {
        let mut state = self.state.write().await;

        let counter = state.counters.entry(counter_key(index)).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn write_chunk(&self, record: &ChunkRecord) -> RagResult<()> {
        let mut state = self.state.write().await;
        state.records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn knn_search(&self, query: &KnnQuery) -> RagResult<Vec<ChunkMatch>> {
        let state = self.state.read().await;

        let schema = state
            .indexes
            .get(&query.index)
            .ok_or_else(|| RagError::Store(format!("{}: no such index", query.index)))?;
        let (_, params) = schema
            .vector_field()
            .ok_or_else(|| RagError::Store(format!("{}: no vector field", query.index)))?;

        let target = decode(&query.vector, params.dtype)?;
        if target.len() != params.dim {
            return Err(RagError::Store(format!(
                "query vector has {} elements, index expects {}",
                target.len(),
                params.dim
            )));
        }

        let mut scored: Vec<ChunkMatch> = state
            .records_under(&schema.prefix)
            .filter_map(|record| {
                // Records that do not fit the schema are not indexed.
                let embedding = decode(&record.embedding, params.dtype).ok()?;
                if embedding.len() != params.dim {
                    return None;
                }
                Some(ChunkMatch {
                    name_chunk: record.name_chunk.clone(),
                    chunk_id: record.chunk_id,
                    chunk_size: record.chunk_size,
                    raw_text: record.raw_text.clone(),
                    score: cosine_distance(&target, &embedding),
                })
            })
            .collect();

        scored.sort_by(|a, b| a.score.total_cmp(&b.score));
        scored.truncate(query.k);
        Ok(scored)
    }

    async fn ping(&self) -> RagResult<()> {
        Ok(())
    }
}

/// `1 - cos(a, b)`; a zero vector is at distance 1 from everything.
fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DType, encode};
    use crate::models::{HnswParams, chunk_key};

    fn schema(name: &str, dim: usize) -> IndexSchema {
        IndexSchema::chunks(name, dim, DType::Float32, HnswParams::default())
    }

    fn record(index: &str, id: u64, embedding: &[f64]) -> ChunkRecord {
        ChunkRecord {
            key: chunk_key(index, id),
            chunk_id: id,
            name_chunk: format!("c{}", id),
            chunk_size: 10,
            raw_text: format!("text {}", id),
            embedding: encode(embedding, DType::Float32),
        }
    }

    fn knn(index: &str, vector: &[f64], k: usize) -> KnnQuery {
        KnnQuery {
            index: index.to_string(),
            vector: encode(vector, DType::Float32),
            k,
        }
    }

    #[tokio::test]
    async fn test_create_and_info() {
        let store = InMemoryVectorStore::new();
        assert!(store.index_info("docs").await.unwrap().is_none());

        store.create_index(&schema("docs", 2)).await.unwrap();
        store.write_chunk(&record("docs", 1, &[1.0, 0.0])).await.unwrap();

        let info = store.index_info("docs").await.unwrap().unwrap();
        assert_eq!(info.num_docs, 1);
        assert!(store.create_index(&schema("docs", 2)).await.is_err());
    }

    #[tokio::test]
    async fn test_counter_is_per_index() {
        let store = InMemoryVectorStore::new();
        assert_eq!(store.next_chunk_id("a").await.unwrap(), 1);
        assert_eq!(store.next_chunk_id("a").await.unwrap(), 2);
        assert_eq!(store.next_chunk_id("b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_knn_orders_by_distance() {
        let store = InMemoryVectorStore::new();
        store.create_index(&schema("docs", 2)).await.unwrap();
        store.write_chunk(&record("docs", 1, &[0.0, 1.0])).await.unwrap();
        store.write_chunk(&record("docs", 2, &[1.0, 0.0])).await.unwrap();
        store.write_chunk(&record("docs", 3, &[1.0, 1.0])).await.unwrap();

        let hits = store.knn_search(&knn("docs", &[1.0, 0.0], 2)).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, 2);
        assert!(hits[0].score.abs() < 1e-9);
        assert_eq!(hits[1].chunk_id, 3);
    }

    #[tokio::test]
    async fn test_knn_ignores_other_prefixes() {
        let store = InMemoryVectorStore::new();
        store.create_index(&schema("docs", 2)).await.unwrap();
        store.write_chunk(&record("docs", 1, &[1.0, 0.0])).await.unwrap();
        store.write_chunk(&record("docs2", 1, &[1.0, 0.0])).await.unwrap();

        let hits = store.knn_search(&knn("docs", &[1.0, 0.0], 10)).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_drop_keeps_or_deletes_docs() {
        let store = InMemoryVectorStore::new();
        store.create_index(&schema("docs", 2)).await.unwrap();
        store.write_chunk(&record("docs", 1, &[1.0, 0.0])).await.unwrap();

        store.drop_index("docs", false).await.unwrap();
        store.create_index(&schema("docs", 2)).await.unwrap();
        assert_eq!(store.index_info("docs").await.unwrap().unwrap().num_docs, 1);

        store.drop_index("docs", true).await.unwrap();
        store.create_index(&schema("docs", 2)).await.unwrap();
        assert_eq!(store.index_info("docs").await.unwrap().unwrap().num_docs, 0);
    }

    #[tokio::test]
    async fn test_drop_missing_index() {
        let store = InMemoryVectorStore::new();
        assert!(matches!(
            store.drop_index("ghost", false).await,
            Err(RagError::IndexNotFound(name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_search_missing_index_fails() {
        let store = InMemoryVectorStore::new();
        assert!(store.knn_search(&knn("ghost", &[1.0], 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_dimension_query_fails() {
        let store = InMemoryVectorStore::new();
        store.create_index(&schema("docs", 3)).await.unwrap();
        assert!(store.knn_search(&knn("docs", &[1.0, 0.0], 1)).await.is_err());
    }

    #[test]
    fn test_cosine_distance() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-12);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
