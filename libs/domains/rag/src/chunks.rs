use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::codec::encode;
use crate::error::{RagError, RagResult};
use crate::models::{ChunkRecord, IngestChunkRequest, chunk_key};
use crate::store::VectorStore;

/// Assigns chunk ids and persists chunk records.
///
/// Ids come from the store's atomic per-index counter, so they keep
/// increasing across restarts and concurrent writers. Nothing is retried.
#[derive(Clone)]
pub struct ChunkStore {
    store: Arc<dyn VectorStore>,
}

impl ChunkStore {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Stores one chunk and returns its key, `{index}:{chunk_id}`.
    #[instrument(
        skip(self, input),
        fields(index = %input.index, dtype = %input.dtype, dim = input.embeddings.len())
    )]
    pub async fn ingest(&self, input: IngestChunkRequest) -> RagResult<String> {
        // Encoding happens before the counter moves: a bad payload writes nothing.
        let embedding = encode(&input.embeddings, input.dtype);

        let chunk_id = self
            .store
            .next_chunk_id(&input.index)
            .await
            .map_err(write_error)?;

        let record = ChunkRecord {
            key: chunk_key(&input.index, chunk_id),
            chunk_id,
            name_chunk: input.name_chunk,
            chunk_size: input.chunk_size,
            raw_text: input.raw_text,
            embedding,
        };

        self.store
            .write_chunk(&record)
            .await
            .map_err(write_error)?;

        debug!(key = %record.key, "Chunk stored");
        Ok(record.key)
    }
}

fn write_error(err: RagError) -> RagError {
    error!(error = %err, "Failed to store chunk");
    match err {
        RagError::Store(msg) => RagError::StoreWrite(msg),
        other => RagError::StoreWrite(other.to_string()),
    }
}
