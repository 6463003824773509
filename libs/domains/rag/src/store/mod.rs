//! Narrow command interface to the backing store.
//!
//! Services never talk to the store directly: they receive an
//! `Arc<dyn VectorStore>` at construction.

mod memory;
mod redis;

pub use memory::InMemoryVectorStore;
pub use redis::RedisVectorStore;

use async_trait::async_trait;

use crate::error::RagResult;
use crate::models::{ChunkMatch, ChunkRecord, IndexInfo, IndexSchema, KnnQuery};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// `None` when no index is registered under `name`
    async fn index_info(&self, name: &str) -> RagResult<Option<IndexInfo>>;

    async fn create_index(&self, schema: &IndexSchema) -> RagResult<()>;

    /// `IndexNotFound` when there is nothing to drop. With `delete_docs` the
    /// indexed hashes go too.
    async fn drop_index(&self, name: &str, delete_docs: bool) -> RagResult<()>;

    /// Atomically increments the index's counter and returns the new value
    async fn next_chunk_id(&self, index: &str) -> RagResult<u64>;

    async fn write_chunk(&self, record: &ChunkRecord) -> RagResult<()>;

    /// Up to `k` hits ordered by ascending distance
    async fn knn_search(&self, query: &KnnQuery) -> RagResult<Vec<ChunkMatch>>;

    async fn ping(&self) -> RagResult<()>;
}
