use std::sync::Arc;

use tracing::{debug, instrument};

use crate::codec::{DType, encode};
use crate::error::{RagError, RagResult};
use crate::models::{ChunkMatch, KnnQuery, SearchOutcome};
use crate::store::VectorStore;

/// Approximate KNN over an index with optional distance cut-off.
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn VectorStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Asks the store for exactly `top_k` neighbours, drops hits whose
    /// distance is above `score_threshold`, then caps at `top_k` again.
    #[instrument(skip(self, dtype, embedding), fields(dtype = %dtype, dim = embedding.len()))]
    pub async fn search(
        &self,
        index: &str,
        dtype: DType,
        embedding: &[f64],
        top_k: usize,
        score_threshold: Option<f64>,
    ) -> RagResult<SearchOutcome> {
        if top_k == 0 {
            return Err(RagError::Validation("top_k must be at least 1".to_string()));
        }

        let query = KnnQuery {
            index: index.to_string(),
            vector: encode(embedding, dtype),
            k: top_k,
        };

        let hits = self
            .store
            .knn_search(&query)
            .await
            .map_err(|e| match e {
                RagError::Search(msg) | RagError::Store(msg) => RagError::Search(msg),
                other => RagError::Search(other.to_string()),
            })?;

        let returned = hits.len();
        let results = filter_hits(hits, top_k, score_threshold);
        debug!(returned, kept = results.len(), "Search finished");

        Ok(SearchOutcome {
            total: results.len(),
            results,
        })
    }
}

/// Store order is preserved.
fn filter_hits(hits: Vec<ChunkMatch>, top_k: usize, threshold: Option<f64>) -> Vec<ChunkMatch> {
    let mut kept: Vec<ChunkMatch> = match threshold {
        Some(limit) => hits.into_iter().filter(|hit| hit.score <= limit).collect(),
        None => hits,
    };
    kept.truncate(top_k);
    kept
}
