use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::codec::DType;
use crate::error::{RagError, RagResult};
use crate::models::{HnswParams, IndexSchema};
use crate::store::VectorStore;

/// Creates and destroys chunk indexes.
///
/// The existence check and the creation are two separate store calls, so two
/// concurrent creates of the same name can both pass the check; the loser
/// then fails in the store with a 500.
#[derive(Clone)]
pub struct IndexManager {
    store: Arc<dyn VectorStore>,
    hnsw: HnswParams,
}

impl IndexManager {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            hnsw: HnswParams::default(),
        }
    }

    pub fn with_hnsw(mut self, hnsw: HnswParams) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Registers `name` and returns the created field names.
    ///
    /// An existing index is an error unless `overwrite` is set, in which case
    /// it is dropped first with its documents kept.
    #[instrument(skip(self, dtype), fields(dtype = %dtype))]
    pub async fn create_index(
        &self,
        name: &str,
        dim: usize,
        dtype: DType,
        overwrite: bool,
    ) -> RagResult<Vec<String>> {
        if dim == 0 {
            return Err(RagError::Validation(
                "embeddings_dim must be at least 1".to_string(),
            ));
        }

        if let Some(existing) = self.store.index_info(name).await? {
            if !overwrite {
                return Err(RagError::IndexAlreadyExists(name.to_string()));
            }
            warn!(
                num_docs = existing.num_docs,
                "Index exists, dropping it before recreating"
            );
            self.store.drop_index(name, false).await?;
        }

        let schema = IndexSchema::chunks(name, dim, dtype, self.hnsw);
        self.store.create_index(&schema).await?;

        info!("Index created");
        Ok(schema.field_names())
    }

    /// Drops `name`; `delete_docs` also removes its chunk records.
    #[instrument(skip(self))]
    pub async fn drop_index(&self, name: &str, delete_docs: bool) -> RagResult<()> {
        self.store.drop_index(name, delete_docs).await?;
        info!("Index dropped");
        Ok(())
    }
}
